use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

/// Failures that abort the current command but leave the session running.
#[derive(Error, Debug)]
pub enum FtpError {
    #[error("{0}: no such file or directory")]
    NotFound(String),

    #[error("No data connection")]
    NoDataConnection,

    #[error("Timeout (no connection for {0} seconds)")]
    DataTimeout(u64),

    #[error("Failed to accept data connection: {0}")]
    DataAccept(#[source] std::io::Error),

    #[error("Connection must come from {0}")]
    PeerMismatch(IpAddr),

    #[error("Cannot open data connection to {target}: {source}")]
    ConnectFailed {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot set up data socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl FtpError {
    pub fn reply_code(&self) -> u16 {
        match self {
            FtpError::NotFound(_) => 550,
            FtpError::NoDataConnection => 425,
            FtpError::DataTimeout(_) | FtpError::DataAccept(_) => 421,
            FtpError::PeerMismatch(_) | FtpError::ConnectFailed { .. } | FtpError::Bind(_) => 425,
            FtpError::Io(_) => 451,
        }
    }
}
