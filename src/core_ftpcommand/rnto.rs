use crate::core_fs::resolve_new;
use crate::session::Session;
use log::{error, info};

/// Handles the RNTO (Rename To) FTP command.
///
/// Needs a source from a preceding RNFR. The pending source is cleared
/// whatever the outcome.
pub fn handle_rnto_command(session: &mut Session, arg: &str) {
    let from = match session.rename_from.take() {
        Some(from) => from,
        None => {
            session.reply.add(503, "RNFR required first");
            return;
        }
    };
    if arg.is_empty() {
        session.reply.add(501, "Missing file name");
        return;
    }

    let to = match resolve_new(&session.current_dir, arg) {
        Ok(to) => to,
        Err(e) => {
            session.reply.add(553, e.to_string());
            return;
        }
    };

    match std::fs::rename(&from, &to) {
        Ok(()) => {
            info!("Renamed {} to {}", from, to);
            session.reply.add(250, "Rename successful");
        }
        Err(e) => {
            error!("Failed to rename {} to {}: {}", from, to, e);
            session.reply.add(553, format!("Rename failed: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::PasswdFile;
    use crate::core_ftpcommand::rnfr::handle_rnfr_command;
    use crate::session::testing::{session_in, take_replies};
    use tempfile::TempDir;

    #[test]
    fn test_rename_pair() {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::write(root.join("old.txt"), b"data").unwrap();
        let (mut session, _replies) = session_in(&root, PasswdFile::default());
        session.current_dir = root.to_string_lossy().into_owned();

        handle_rnfr_command(&mut session, "old.txt");
        assert!(take_replies(&mut session).starts_with("350 "));
        handle_rnto_command(&mut session, "new.txt");
        assert_eq!(take_replies(&mut session), "250 Rename successful\r\n");
        assert!(!root.join("old.txt").exists());
        assert_eq!(std::fs::read(root.join("new.txt")).unwrap(), b"data");
        assert!(session.rename_from.is_none());
    }

    #[test]
    fn test_rnto_without_rnfr() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());

        handle_rnto_command(&mut session, "x");
        assert_eq!(take_replies(&mut session), "503 RNFR required first\r\n");
    }

    #[test]
    fn test_rnfr_missing_source() {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        let (mut session, _replies) = session_in(&root, PasswdFile::default());
        session.current_dir = root.to_string_lossy().into_owned();

        handle_rnfr_command(&mut session, "ghost");
        assert!(take_replies(&mut session).starts_with("550 "));
        assert!(session.rename_from.is_none());
    }

    #[test]
    fn test_rnto_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::write(root.join("a"), b"").unwrap();
        let (mut session, _replies) = session_in(&root, PasswdFile::default());
        session.current_dir = root.to_string_lossy().into_owned();

        handle_rnfr_command(&mut session, "a");
        take_replies(&mut session);
        handle_rnto_command(&mut session, "nowhere/b");
        assert!(take_replies(&mut session).starts_with("553 "));
        assert!(session.rename_from.is_none());
        assert!(root.join("a").exists());
    }
}
