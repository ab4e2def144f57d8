use crate::core_auth::AuthState;
use crate::core_network::datachan::DataPort;
use crate::session::Session;
use log::info;

/// Handles the REIN FTP command: drops the login and every piece of
/// per-transfer state, keeping the control connection open.
pub fn handle_rein_command(session: &mut Session) {
    info!("Reinitializing session of {}", session.peer_addr);
    session.auth = AuthState::default();
    session.rename_from = None;
    session.restart_at = 0;
    session.data = DataPort::None;
    session.reply.add(220, "Service ready for new user");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::PasswdFile;
    use crate::session::testing::{session_in, take_replies};
    use tempfile::TempDir;

    #[test]
    fn test_rein_logs_out() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());
        session.auth = AuthState::Guest;
        session.restart_at = 10;
        session.rename_from = Some("/tmp/x".into());

        handle_rein_command(&mut session);
        assert_eq!(take_replies(&mut session), "220 Service ready for new user\r\n");
        assert!(!session.auth.is_logged_in());
        assert_eq!(session.restart_at, 0);
        assert!(session.rename_from.is_none());
    }
}
