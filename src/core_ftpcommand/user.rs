use crate::constants::GUEST_NAMES;
use crate::core_auth::privilege::become_account;
use crate::core_auth::AuthState;
use crate::session::Session;
use log::{error, info, warn};

/// Handles the USER FTP command.
///
/// Guest names log in immediately when guest access is enabled. Any other
/// known account is remembered as pending until PASS; unknown accounts get
/// the same 331 reply but leave nothing pending.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
/// * `username` - The account name provided by the client.
pub fn handle_user_command(session: &mut Session, username: &str) {
    match &session.auth {
        AuthState::Named(_) => {
            session.reply.add(530, "Already logged in");
            return;
        }
        AuthState::Guest => {
            session.reply.add(230, "Already logged in anonymously");
            return;
        }
        AuthState::Unauthenticated { .. } => {}
    }

    if username.is_empty() {
        session.reply.add(501, "Missing user name");
        return;
    }

    if GUEST_NAMES.iter().any(|g| g.eq_ignore_ascii_case(username)) {
        login_guest(session);
        return;
    }

    match session.identities.lookup(username) {
        Some(identity) => {
            info!("Username accepted: {}", identity.name);
            session
                .reply
                .add(331, format!("User {} needs password", identity.name));
            session.auth = AuthState::Unauthenticated {
                pending: Some(identity.name),
            };
        }
        None => {
            info!("Unknown user: {}", username);
            session.reply.add(331, format!("Unknown user {}", username));
            session.auth = AuthState::Unauthenticated { pending: None };
        }
    }
}

fn login_guest(session: &mut Session) {
    if !session.config.auth.guest_enabled {
        session.reply.add(530, "Anonymous login is not permitted");
        return;
    }

    let guest_user = &session.config.auth.guest_user;
    if !guest_user.is_empty() {
        if let Err(e) = become_account(guest_user) {
            error!("Cannot switch guest session to {}: {}", guest_user, e);
            session.reply.add(530, "Anonymous user cannot log in");
            return;
        }
    }

    let home = &session.config.auth.guest_home;
    let home = match std::fs::canonicalize(home) {
        Ok(path) if path.is_dir() => path,
        _ => {
            warn!("Guest home {:?} is not a usable directory", home);
            session.reply.add(530, "Anonymous user cannot log in");
            return;
        }
    };

    session.current_dir = home.to_string_lossy().replace('\\', "/");
    session.auth = AuthState::Guest;
    session.reply.add(230, "Anonymous login successful");
    info!("Anonymous login from {}", session.peer_addr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core_auth::PasswdFile;
    use crate::session::testing::{session_in, take_replies};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn passwd_with_alice(home: &std::path::Path) -> PasswdFile {
        let hashed = bcrypt::hash("pw", 4).unwrap();
        PasswdFile::parse(&format!("alice:{}:{}", hashed, home.display()))
    }

    #[test]
    fn test_guest_login() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());

        handle_user_command(&mut session, "anonymous");
        assert_eq!(take_replies(&mut session), "230 Anonymous login successful\r\n");
        assert!(session.auth.is_guest());
        assert_eq!(
            session.current_dir,
            std::fs::canonicalize(dir.path()).unwrap().to_string_lossy()
        );

        handle_user_command(&mut session, "ftp");
        assert_eq!(take_replies(&mut session), "230 Already logged in anonymously\r\n");
    }

    #[test]
    fn test_guest_disabled() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        let mut config = Config::clone(&session.config);
        config.auth.guest_enabled = false;
        session.config = Arc::new(config);

        handle_user_command(&mut session, "ftp");
        assert_eq!(take_replies(&mut session), "530 Anonymous login is not permitted\r\n");
        assert!(!session.auth.is_logged_in());
    }

    #[test]
    fn test_guest_account_must_exist_under_root() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        let mut config = Config::clone(&session.config);
        config.auth.guest_user = String::from("no-such-account-here");
        session.config = Arc::new(config);

        handle_user_command(&mut session, "ftp");
        if nix::unistd::geteuid().is_root() {
            assert_eq!(take_replies(&mut session), "530 Anonymous user cannot log in\r\n");
            assert!(!session.auth.is_logged_in());
        } else {
            assert_eq!(take_replies(&mut session), "230 Anonymous login successful\r\n");
        }
    }

    #[test]
    fn test_known_and_unknown_users() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), passwd_with_alice(dir.path()));

        handle_user_command(&mut session, "alice");
        assert_eq!(take_replies(&mut session), "331 User alice needs password\r\n");
        assert_eq!(session.auth.pending_user(), Some("alice"));

        handle_user_command(&mut session, "mallory");
        assert_eq!(take_replies(&mut session), "331 Unknown user mallory\r\n");
        assert_eq!(session.auth.pending_user(), None);
        assert!(!session.auth.is_logged_in());
    }

    #[test]
    fn test_named_user_cannot_switch() {
        let dir = TempDir::new().unwrap();
        let passwd = passwd_with_alice(dir.path());
        let alice = crate::core_auth::IdentityProvider::lookup(&passwd, "alice").unwrap();
        let (mut session, _replies) = session_in(dir.path(), passwd);
        session.auth = AuthState::Named(alice);

        handle_user_command(&mut session, "ftp");
        assert_eq!(take_replies(&mut session), "530 Already logged in\r\n");
    }
}
