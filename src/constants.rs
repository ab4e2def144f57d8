// src/constants.rs

pub const USERNAME_REGEX: &str = r"^[a-zA-Z0-9_.-]{1,32}$";

/// Longest command line accepted from the control channel, CRLF included.
pub const MAX_COMMAND_LENGTH: usize = 512;

pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 900;
pub const DEFAULT_DATA_PORT: u16 = 20;

/// Account names that select the guest login.
pub const GUEST_NAMES: [&str; 2] = ["ftp", "anonymous"];

pub const SYSTEM_TYPE: &str = "UNIX Type: L8";
