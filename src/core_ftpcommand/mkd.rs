use crate::core_fs::resolve_new;
use crate::session::Session;
use log::{info, warn};
use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;

/// Handles the MKD (Make Directory) FTP command.
///
/// Creates a single directory with mode 0755; the parent must already exist.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
/// * `arg` - The directory name, relative to the working directory or absolute.
pub fn handle_mkd_command(session: &mut Session, arg: &str) {
    if arg.is_empty() {
        session.reply.add(501, "Missing directory name");
        return;
    }

    let path = match resolve_new(&session.current_dir, arg) {
        Ok(path) => path,
        Err(e) => {
            session.reply.add(e.reply_code(), e.to_string());
            return;
        }
    };

    match DirBuilder::new().mode(0o755).create(&path) {
        Ok(()) => {
            info!("Created directory {}", path);
            session
                .reply
                .add(257, format!("\"{}\" directory created", path.replace('"', "\"\"")));
        }
        Err(e) => {
            warn!("Failed to create directory {}: {}", path, e);
            session
                .reply
                .add(550, format!("Cannot create directory: {}", e));
        }
    }
}
