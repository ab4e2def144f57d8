//! Commands whose whole job is a fixed reply.

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::session::Session;

pub fn handle_noop_command(session: &mut Session) {
    session.reply.add(200, "NOOP ok");
}

pub fn handle_acct_command(session: &mut Session) {
    session.reply.add(500, "Account authentication is not supported");
}

pub fn handle_feat_command(session: &mut Session) {
    session
        .reply
        .add(500, "Commands beyond RFC 959 are not supported");
}

pub fn handle_smnt_command(session: &mut Session) {
    session.reply.add(502, "Structure mount is not supported");
}

/// ALLO is superfluous for a server that never preallocates.
pub fn handle_allo_command(session: &mut Session) {
    session.reply.add(202, "No storage allocation necessary");
}

/// Acknowledges ABOR. Transfers run to completion inside their command, so
/// there is never anything in flight to interrupt.
pub fn handle_abor_command(session: &mut Session) {
    session.reply.add(226, "Abort acknowledged");
}

pub fn handle_site_command(session: &mut Session) {
    session.reply.add(200, "Nothing to do");
}

pub fn handle_unsupported(session: &mut Session, command: FtpCommand) {
    session
        .reply
        .add(502, format!("{:?} is not implemented", command));
}
