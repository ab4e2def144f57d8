pub mod reply;

pub use reply::ReplyQueue;
