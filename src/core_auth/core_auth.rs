use std::path::PathBuf;

/// A named account as seen by the protocol engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub uid: Option<u32>,
    pub home_dir: PathBuf,
    pub password_hash: String,
}

impl Identity {
    /// Parses a passwd line: `name:bcrypt-hash:home[:uid]`.
    ///
    /// The hash itself contains no `:`, so a plain split is enough.
    pub fn from_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        if parts[0].is_empty() || parts[1].is_empty() || parts[2].is_empty() {
            return None;
        }
        let uid = match parts.get(3) {
            Some(raw) => Some(raw.trim().parse::<u32>().ok()?),
            None => None,
        };

        Some(Identity {
            name: parts[0].to_string(),
            uid,
            home_dir: PathBuf::from(parts[2]),
            password_hash: parts[1].to_string(),
        })
    }
}

/// Login state of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No login yet. `pending` holds the account named by a recognised USER.
    Unauthenticated { pending: Option<String> },
    Named(Identity),
    Guest,
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState::Unauthenticated { pending: None }
    }
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        !matches!(self, AuthState::Unauthenticated { .. })
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, AuthState::Guest)
    }

    pub fn pending_user(&self) -> Option<&str> {
        match self {
            AuthState::Unauthenticated { pending } => pending.as_deref(),
            _ => None,
        }
    }

    /// Name for log lines.
    pub fn display_name(&self) -> &str {
        match self {
            AuthState::Unauthenticated { .. } => "-",
            AuthState::Named(identity) => &identity.name,
            AuthState::Guest => "ftp",
        }
    }
}
