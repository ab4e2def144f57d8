use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ferroftpd", about = "An RFC 959 FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Override the control port from the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a bcrypt hash of the given password for the passwd file and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}
