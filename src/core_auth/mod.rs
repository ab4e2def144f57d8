pub mod core_auth;
pub mod helper;
pub mod privilege;
pub mod provider;

pub use core_auth::{AuthState, Identity};
pub use provider::{IdentityProvider, PasswdFile};
