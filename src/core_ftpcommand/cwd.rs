use crate::core_fs::resolve;
use crate::session::Session;
use log::info;

/// Handles the CWD (Change Working Directory) FTP command.
///
/// The target is resolved against the current directory and must be an
/// existing directory; the working directory stays unchanged otherwise.
pub fn handle_cwd_command(session: &mut Session, arg: &str) {
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

    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => {
            info!("Working directory of {} is now {}", session.peer_addr, path);
            session.current_dir = path;
            session
                .reply
                .add(250, format!("Directory changed to {}", session.current_dir));
        }
        Ok(_) => session.reply.add(550, "Not a directory"),
        Err(e) => session
            .reply
            .add(550, format!("Cannot change directory to {}: {}", arg, e)),
    }
}

/// Handles the CDUP FTP command, i.e. `CWD ..`.
pub fn handle_cdup_command(session: &mut Session) {
    handle_cwd_command(session, "..");
}
