mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_error;
mod core_fs;
mod core_ftpcommand;
mod core_network;
mod core_reply;
mod core_transfer;
mod server;
mod session;

use crate::config::Config;
use crate::core_auth::helper::hash_password;
use crate::core_auth::PasswdFile;
use crate::core_cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use env_logger::{Builder, Env};
use log::warn;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "/etc/ferroftpd.conf";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Some(password) = args.hash_password.as_deref() {
        let hashed = hash_password(password).context("Failed to hash password")?;
        println!("{}", hashed);
        return Ok(());
    }

    // Initialize the logger with a custom format and colors
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp().to_string();
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red(),
                log::Level::Warn => record.level().to_string().yellow(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().white(),
            };
            writeln!(buf, "[{}] [{}] {}", timestamp, level, record.args())
        })
        .init();

    let mut config = load_config(&args.config)?;
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    let identities = match PasswdFile::load(&config.auth.passwd_file) {
        Ok(passwd) => passwd,
        Err(e) => {
            warn!("{}; only anonymous logins will work", e);
            PasswdFile::default()
        }
    };

    server::run(config, Arc::new(identities)).await
}

/// An explicit `--config` must exist; a missing default file means defaults.
fn load_config(path: &str) -> Result<Config> {
    if !path.is_empty() {
        return Config::load_from_file(path);
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        Config::load_from_file(DEFAULT_CONFIG_PATH)
    } else {
        warn!(
            "{} not found, running with built-in defaults",
            DEFAULT_CONFIG_PATH
        );
        Ok(Config::default())
    }
}
