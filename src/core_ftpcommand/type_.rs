use crate::session::Session;

// Only binary images, file structure and stream mode exist here.

pub fn handle_type_command(session: &mut Session, arg: &str) {
    if arg.eq_ignore_ascii_case("I") {
        session.reply.add(200, "Binary type set");
    } else {
        session.reply.add(504, "Only binary type is supported");
    }
}

pub fn handle_stru_command(session: &mut Session, arg: &str) {
    if arg.eq_ignore_ascii_case("F") {
        session.reply.add(200, "File structure set");
    } else {
        session.reply.add(504, "Only file structure is supported");
    }
}

pub fn handle_mode_command(session: &mut Session, arg: &str) {
    if arg.eq_ignore_ascii_case("S") {
        session.reply.add(200, "Stream mode set");
    } else {
        session.reply.add(504, "Only stream mode is supported");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::PasswdFile;
    use crate::session::testing::{session_in, take_replies};
    use tempfile::TempDir;

    #[test]
    fn test_only_binary_stream_file() {
        let dir = TempDir::new().unwrap();
        let (mut session, _replies) = session_in(dir.path(), PasswdFile::default());

        handle_type_command(&mut session, "i");
        assert_eq!(take_replies(&mut session), "200 Binary type set\r\n");
        handle_type_command(&mut session, "A");
        assert!(take_replies(&mut session).starts_with("504 "));
        handle_stru_command(&mut session, "R");
        assert!(take_replies(&mut session).starts_with("504 "));
        handle_mode_command(&mut session, "S");
        assert_eq!(take_replies(&mut session), "200 Stream mode set\r\n");
    }
}
