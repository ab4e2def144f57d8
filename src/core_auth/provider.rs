use crate::constants::USERNAME_REGEX;
use crate::core_auth::core_auth::Identity;
use crate::core_auth::helper::verify_password;
use crate::core_auth::privilege::{become_account, switch_thread_to, Credentials, PrivilegeError};
use log::{info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Home directory {0:?} is not available")]
    HomeUnavailable(std::path::PathBuf),

    #[error("Failed to read passwd file {path:?}: {source}")]
    PasswdRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Privilege(#[from] PrivilegeError),
}

/// Account database the authentication gate consults.
pub trait IdentityProvider: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Identity>;

    fn authenticate(&self, name: &str, password: &str) -> bool;

    /// Switches the calling session thread into `identity`'s context.
    fn become_user(&self, identity: &Identity) -> Result<(), AuthError>;
}

/// Accounts loaded from a `name:bcrypt-hash:home[:uid]` file.
#[derive(Debug, Default)]
pub struct PasswdFile {
    entries: HashMap<String, Identity>,
}

impl PasswdFile {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path).map_err(|source| AuthError::PasswdRead {
            path: path.to_path_buf(),
            source,
        })?;
        let passwd = Self::parse(&content);
        info!("Loaded {} account(s) from {:?}", passwd.len(), path);
        Ok(passwd)
    }

    pub fn parse(content: &str) -> Self {
        let name_pattern = Regex::new(USERNAME_REGEX).ok();
        let mut entries = HashMap::new();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match Identity::from_line(line) {
                Some(identity)
                    if name_pattern
                        .as_ref()
                        .map_or(true, |re| re.is_match(&identity.name)) =>
                {
                    entries.insert(identity.name.clone(), identity);
                }
                _ => warn!("Skipping malformed passwd line {}", lineno + 1),
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl IdentityProvider for PasswdFile {
    fn lookup(&self, name: &str) -> Option<Identity> {
        self.entries.get(name).cloned()
    }

    fn authenticate(&self, name: &str, password: &str) -> bool {
        self.entries
            .get(name)
            .map_or(false, |identity| verify_password(password, &identity.password_hash))
    }

    /// Drops the session thread to the identity's uid, or to the system
    /// account of the same name when the entry carries none. The home
    /// directory is checked with the new credentials.
    fn become_user(&self, identity: &Identity) -> Result<(), AuthError> {
        match identity.uid {
            Some(uid) => switch_thread_to(Credentials::for_uid(uid))?,
            None => become_account(&identity.name)?,
        }
        if !identity.home_dir.is_dir() {
            return Err(AuthError::HomeUnavailable(identity.home_dir.clone()));
        }
        info!(
            "Session now acting as {} (uid {})",
            identity.name,
            Credentials::current().uid
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn passwd_for(home: &Path) -> PasswdFile {
        let hashed = bcrypt::hash("letmein", 4).unwrap();
        PasswdFile::parse(&format!(
            "# accounts\n\nalice:{}:{}:{}\nbad name:{}:/tmp\nbroken\n",
            hashed,
            home.display(),
            Credentials::current().uid,
            hashed
        ))
    }

    #[test]
    fn test_parse_skips_invalid_lines() {
        let dir = TempDir::new().unwrap();
        let passwd = passwd_for(dir.path());
        assert_eq!(passwd.len(), 1);
        assert!(passwd.lookup("alice").is_some());
        assert!(passwd.lookup("bad name").is_none());
    }

    #[test]
    fn test_authenticate() {
        let dir = TempDir::new().unwrap();
        let passwd = passwd_for(dir.path());
        assert!(passwd.authenticate("alice", "letmein"));
        assert!(!passwd.authenticate("alice", "nope"));
        assert!(!passwd.authenticate("mallory", "letmein"));
    }

    #[test]
    fn test_become_user_requires_home() {
        let dir = TempDir::new().unwrap();
        let passwd = passwd_for(dir.path());
        let mut alice = passwd.lookup("alice").unwrap();
        assert!(passwd.become_user(&alice).is_ok());

        alice.home_dir = dir.path().join("gone");
        assert!(matches!(
            passwd.become_user(&alice),
            Err(AuthError::HomeUnavailable(_))
        ));
    }

    #[test]
    fn test_foreign_uid_is_switched_or_refused() {
        let dir = TempDir::new().unwrap();
        let passwd = passwd_for(dir.path());
        let mut alice = passwd.lookup("alice").unwrap();
        alice.uid = Some(Credentials::current().uid + 1);
        alice.home_dir = dir.path().join("home");
        std::fs::create_dir(&alice.home_dir).unwrap();

        let outcome = std::thread::spawn(move || {
            let result = passwd.become_user(&alice).map_err(|e| e.to_string());
            (result, Credentials::current().uid)
        })
        .join()
        .unwrap();

        if nix::unistd::geteuid().is_root() {
            // The tempdir is root-only, so the dropped thread cannot enter it.
            assert!(outcome.0.unwrap_err().starts_with("Home directory"));
            assert_eq!(outcome.1, 1);
        } else {
            assert!(outcome.0.unwrap_err().starts_with("Cannot switch"));
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(PasswdFile::load(&dir.path().join("passwd")).is_err());
    }
}
