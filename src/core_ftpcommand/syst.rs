use crate::constants::SYSTEM_TYPE;
use crate::session::Session;

/// Handles the SYST FTP command.
pub fn handle_syst_command(session: &mut Session) {
    session.reply.add(215, SYSTEM_TYPE);
}
