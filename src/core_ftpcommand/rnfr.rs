use crate::core_fs::resolve;
use crate::session::Session;
use log::info;

/// Handles the RNFR (Rename From) FTP command.
///
/// Remembers the resolved source path until the next RNTO.
pub fn handle_rnfr_command(session: &mut Session, arg: &str) {
    if arg.is_empty() {
        session.reply.add(501, "Missing file name");
        return;
    }

    match resolve(&session.current_dir, arg) {
        Ok(path) => {
            info!("Rename source set to {}", path);
            session.rename_from = Some(path);
            session
                .reply
                .add(350, "File exists, ready for destination name");
        }
        Err(e) => {
            session.rename_from = None;
            session.reply.add(e.reply_code(), e.to_string());
        }
    }
}
