use crate::constants::MAX_COMMAND_LENGTH;
use crate::core_ftpcommand::ftpcommand::{parse_command_line, FtpCommand};
use crate::core_ftpcommand::{
    cwd, dele, help, list, mkd, pass, pwd, rein, rest, retr, rmd, rnfr, rnto, simple, stor,
    syst, type_, user,
};
use crate::core_network::{pasv, port};
use crate::session::Session;
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio::time::timeout;

/// What the session loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

enum Line {
    Command(String),
    TooLong,
}

/// Reads one line of at most [`MAX_COMMAND_LENGTH`] bytes. `None` on EOF.
async fn read_command_line<R>(reader: &mut R) -> std::io::Result<Option<Line>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(MAX_COMMAND_LENGTH as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') && n == MAX_COMMAND_LENGTH {
        // Discard the rest of the oversized line, one bounded piece at a time.
        loop {
            buf.clear();
            let n = (&mut *reader)
                .take(MAX_COMMAND_LENGTH as u64)
                .read_until(b'\n', &mut buf)
                .await?;
            if n == 0 || buf.last() == Some(&b'\n') {
                break;
            }
        }
        return Ok(Some(Line::TooLong));
    }
    Ok(Some(Line::Command(String::from_utf8_lossy(&buf).into_owned())))
}

/// Reads one command from the control channel and executes it.
///
/// An idle timeout queues a 421 and ends the session; any other read failure
/// ends it silently.
pub async fn read_and_dispatch<R>(session: &mut Session, reader: &mut R) -> std::io::Result<Flow>
where
    R: AsyncBufRead + Unpin,
{
    let line = match timeout(session.idle_timeout, read_command_line(reader)).await {
        Err(_) => {
            info!("Control connection from {} timed out", session.peer_addr);
            session.reply.add(
                421,
                format!("Timeout ({} seconds)", session.idle_timeout.as_secs()),
            );
            return Ok(Flow::Quit);
        }
        Ok(Err(e)) => {
            debug!("Control read from {} failed: {}", session.peer_addr, e);
            return Ok(Flow::Quit);
        }
        Ok(Ok(None)) => {
            debug!("Client {} disconnected", session.peer_addr);
            return Ok(Flow::Quit);
        }
        Ok(Ok(Some(Line::TooLong))) => {
            session.reply.add(500, "Command line too long");
            return Ok(Flow::Continue);
        }
        Ok(Ok(Some(Line::Command(line)))) => line,
    };

    dispatch_line(session, &line).await
}

/// Parses and executes one command line.
pub async fn dispatch_line(session: &mut Session, line: &str) -> std::io::Result<Flow> {
    let (verb, arg) = parse_command_line(line);
    if verb.is_empty() {
        session.reply.add(221, "Goodbye");
        return Ok(Flow::Quit);
    }

    let shown_arg = if verb == "PASS" { "****" } else { arg };
    info!(
        "[{}@{}] {} {}",
        session.auth.display_name(),
        session.peer_addr,
        verb,
        shown_arg
    );

    let command = match FtpCommand::from_str(&verb) {
        Some(command) => command,
        None => {
            session.reply.add(500, "Unknown command");
            return Ok(Flow::Continue);
        }
    };

    if command.requires_login() && !session.auth.is_logged_in() {
        session.reply.add(530, "Please login with USER and PASS");
        return Ok(Flow::Continue);
    }

    execute(session, command, arg).await
}

async fn execute(session: &mut Session, command: FtpCommand, arg: &str) -> std::io::Result<Flow> {
    match command {
        FtpCommand::USER => user::handle_user_command(session, arg),
        FtpCommand::PASS => pass::handle_pass_command(session, arg).await,
        FtpCommand::ACCT => simple::handle_acct_command(session),
        FtpCommand::QUIT => {
            session.reply.add(221, "Goodbye");
            return Ok(Flow::Quit);
        }
        FtpCommand::FEAT => simple::handle_feat_command(session),
        FtpCommand::PORT => port::handle_port_command(session, arg),
        FtpCommand::PASV => pasv::handle_pasv_command(session).await,
        FtpCommand::SYST => syst::handle_syst_command(session),
        FtpCommand::HELP => help::handle_help_command(session, arg),
        FtpCommand::NOOP => simple::handle_noop_command(session),
        FtpCommand::CWD => cwd::handle_cwd_command(session, arg),
        FtpCommand::CDUP => cwd::handle_cdup_command(session),
        FtpCommand::SMNT => simple::handle_smnt_command(session),
        FtpCommand::REIN => rein::handle_rein_command(session),
        FtpCommand::RETR => retr::handle_retr_command(session, arg).await?,
        FtpCommand::TYPE => type_::handle_type_command(session, arg),
        FtpCommand::STRU => type_::handle_stru_command(session, arg),
        FtpCommand::MODE => type_::handle_mode_command(session, arg),
        FtpCommand::STOR => stor::handle_stor_command(session, arg).await?,
        FtpCommand::STOU | FtpCommand::APPE => simple::handle_unsupported(session, command),
        FtpCommand::ALLO => simple::handle_allo_command(session),
        FtpCommand::REST => rest::handle_rest_command(session, arg),
        FtpCommand::RNFR => rnfr::handle_rnfr_command(session, arg),
        FtpCommand::RNTO => rnto::handle_rnto_command(session, arg),
        FtpCommand::ABOR => simple::handle_abor_command(session),
        FtpCommand::DELE => dele::handle_dele_command(session, arg),
        FtpCommand::RMD => rmd::handle_rmd_command(session, arg),
        FtpCommand::MKD => mkd::handle_mkd_command(session, arg),
        FtpCommand::PWD => pwd::handle_pwd_command(session),
        FtpCommand::LIST => list::handle_list_command(session, arg).await?,
        FtpCommand::NLST => list::handle_nlst_command(session, arg).await?,
        FtpCommand::SITE => simple::handle_site_command(session),
    }
    Ok(Flow::Continue)
}
