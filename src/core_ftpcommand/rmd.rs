use crate::core_fs::resolve;
use crate::session::Session;
use log::{info, warn};

/// Handles the RMD (Remove Directory) FTP command. Only empty directories
/// can be removed.
pub fn handle_rmd_command(session: &mut Session, arg: &str) {
    if arg.is_empty() {
        session.reply.add(501, "Missing directory name");
        return;
    }

    let path = match resolve(&session.current_dir, arg) {
        Ok(path) => path,
        Err(e) => {
            session.reply.add(e.reply_code(), e.to_string());
            return;
        }
    };

    match std::fs::remove_dir(&path) {
        Ok(()) => {
            info!("Removed directory {}", path);
            session
                .reply
                .add(250, format!("Directory '{}' removed", arg));
        }
        Err(e) => {
            warn!("Failed to remove directory {}: {}", path, e);
            session
                .reply
                .add(550, format!("Cannot remove directory: {}", e));
        }
    }
}
