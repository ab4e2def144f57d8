use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_DATA_PORT, DEFAULT_IDLE_TIMEOUT_SECS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub data_port: u16,          // Local port for active mode, 0 for ephemeral
    pub pasv_address: String,    // Address advertised in 227 replies, empty = control address
    pub idle_timeout: u64,       // Seconds
    pub max_connections_per_ip: usize,
    pub transfer_buffer_size: usize,
    pub banner: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub passwd_file: PathBuf,
    pub guest_enabled: bool,
    pub guest_home: PathBuf,
    pub guest_user: String, // System account guest sessions run as, empty = server's own
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 21,
            data_port: DEFAULT_DATA_PORT,
            pasv_address: String::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT_SECS,
            max_connections_per_ip: 5,
            transfer_buffer_size: DEFAULT_CHUNK_SIZE,
            banner: String::from("Welcome"),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            passwd_file: PathBuf::from("/etc/ferroftpd.passwd"),
            guest_enabled: true,
            guest_home: PathBuf::from("/srv/ftp"),
            guest_user: String::from("ftp"),
        }
    }
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    /// Chunk size used by transfers, never zero.
    pub fn chunk_size(&self) -> usize {
        self.transfer_buffer_size.max(1)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    log::info!(
        "  Listen: {}:{}",
        config.server.listen_address,
        config.server.listen_port
    );
    log::info!("  Active data port: {}", config.server.data_port);
    if !config.server.pasv_address.is_empty() {
        log::info!("  PASV address: {}", config.server.pasv_address);
    }
    log::info!("  Idle timeout: {} s", config.server.idle_timeout);
    log::info!(
        "  Max connections per IP: {}",
        config.server.max_connections_per_ip
    );
    log::info!("  Passwd file: {:?}", config.auth.passwd_file);
    log::info!(
        "  Guest login: {} ({:?} as {:?})",
        config.auth.guest_enabled,
        config.auth.guest_home,
        config.auth.guest_user
    );
}
