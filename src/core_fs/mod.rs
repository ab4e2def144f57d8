// Filesystem-facing helpers: name resolution and listing entries
pub mod listing;
pub mod resolve;

pub use resolve::{resolve, resolve_new};
