use crate::session::Session;

/// Handles the REST FTP command. The offset applies to the next RETR or
/// STOR only.
pub fn handle_rest_command(session: &mut Session, arg: &str) {
    match arg.parse::<u64>() {
        Ok(offset) => {
            session.restart_at = offset;
            session.reply.add(
                350,
                format!("Restarting at {}. Send RETR or STOR to proceed", offset),
            );
        }
        Err(_) => session.reply.add(501, "Invalid restart offset"),
    }
}
