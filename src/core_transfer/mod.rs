pub mod stats;
pub mod transfer;

pub use stats::TransferStats;
pub use transfer::{receive_file, send_file, TransferError};
