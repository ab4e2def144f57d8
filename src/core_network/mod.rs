pub mod datachan;
pub mod limiter;
pub mod network;
pub mod pasv;
pub mod port;
