use crate::session::Session;

/// Handles the PWD FTP command. Embedded quotes are doubled as RFC 959
/// requires.
pub fn handle_pwd_command(session: &mut Session) {
    let quoted = session.current_dir.replace('"', "\"\"");
    session.reply.add(257, format!("\"{}\"", quoted));
}
