use crate::core_fs::resolve;
use crate::session::Session;
use log::{info, warn};

/// Handles the DELE (Delete) FTP command.
pub fn handle_dele_command(session: &mut Session, arg: &str) {
    if arg.is_empty() {
        session.reply.add(501, "Missing file name");
        return;
    }

    let path = match resolve(&session.current_dir, arg) {
        Ok(path) => path,
        Err(e) => {
            session.reply.add(e.reply_code(), e.to_string());
            return;
        }
    };

    match std::fs::remove_file(&path) {
        Ok(()) => {
            info!("Deleted {}", path);
            session.reply.add(250, format!("Deleted '{}'", arg));
        }
        Err(e) => {
            warn!("Failed to delete {}: {}", path, e);
            session
                .reply
                .add(550, format!("Cannot delete '{}': {}", arg, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::PasswdFile;
    use crate::session::testing::{session_in, take_replies};
    use tempfile::TempDir;

    #[test]
    fn test_dele() {
        let dir = TempDir::new().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::write(root.join("gone"), b"x").unwrap();
        std::fs::create_dir(root.join("folder")).unwrap();
        let (mut session, _replies) = session_in(&root, PasswdFile::default());
        session.current_dir = root.to_string_lossy().into_owned();

        handle_dele_command(&mut session, "gone");
        assert_eq!(take_replies(&mut session), "250 Deleted 'gone'\r\n");
        assert!(!root.join("gone").exists());

        handle_dele_command(&mut session, "gone");
        assert!(take_replies(&mut session).starts_with("550 "));

        handle_dele_command(&mut session, "folder");
        assert!(take_replies(&mut session).starts_with("550 Cannot delete 'folder'"));
        assert!(root.join("folder").is_dir());
    }
}
