use crate::core_fs::resolve_new;
use crate::core_network::datachan::open_data_channel;
use crate::core_transfer::{receive_file, TransferError};
use crate::session::Session;
use log::{error, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Permissions while the upload is in progress, and after it completes.
const PARTIAL_MODE: u32 = 0o600;
const COMPLETE_MODE: u32 = 0o644;

fn open_destination(path: &str, offset: u64) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    // A resumed upload keeps what is already there up to the offset.
    if offset == 0 {
        options.truncate(true);
    }
    options.mode(PARTIAL_MODE);
    options.open(path)
}

fn set_mode(path: &str, mode: u32) -> std::io::Result<()> {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

/// Handles the STOR (Store) FTP command.
///
/// Writes everything the client sends over the data channel into `arg`,
/// starting at the pending REST offset. A failed upload is removed again
/// when possible and the client is told which of the two happened.
pub async fn handle_stor_command(session: &mut Session, arg: &str) -> std::io::Result<()> {
    if arg.is_empty() {
        warn!("STOR command received with no arguments");
        session.reply.add(501, "Missing file name");
        return Ok(());
    }

    let offset = session.take_restart_offset();

    let path = match resolve_new(&session.current_dir, arg) {
        Ok(path) => path,
        Err(e) => {
            session.reply.add(553, e.to_string());
            return Ok(());
        }
    };

    let mut file = match open_destination(&path, offset) {
        Ok(file) => file,
        Err(e) => {
            session
                .reply
                .add(553, format!("Cannot open file {}: {}", arg, e));
            return Ok(());
        }
    };

    if offset > 0 {
        let positioned = file
            .set_len(offset)
            .and_then(|()| file.seek(SeekFrom::Start(offset)).map(|_| ()));
        if let Err(e) = positioned {
            session
                .reply
                .add(451, format!("Cannot seek to offset {}: {}", offset, e));
            return Ok(());
        }
    }

    let mut data = match open_data_channel(session).await {
        Some(data) => data,
        None => return Ok(()),
    };
    session.flush_replies().await?;

    let mut file = tokio::fs::File::from_std(file);
    let result = receive_file(
        &mut data,
        &mut file,
        session.chunk_size,
        session.idle_timeout,
    )
    .await;
    drop(file);
    drop(data);

    match result {
        Ok(stats) => {
            info!("Received {} from {}: {}", path, session.peer_addr, stats);
            if let Err(e) = set_mode(&path, COMPLETE_MODE) {
                warn!("Cannot relax permissions of {}: {}", path, e);
            }
            session
                .reply
                .add(226, format!("Transfer complete ({})", stats));
        }
        Err(e) => {
            error!("Receiving {} failed: {}", path, e);
            report_failed_upload(session, &path, arg, &e);
        }
    }
    Ok(())
}

fn report_failed_upload(session: &mut Session, path: &str, arg: &str, e: &TransferError) {
    let outcome = match std::fs::remove_file(path) {
        Ok(()) => "removed",
        Err(remove_err) => {
            warn!("Cannot remove partial upload {}: {}", path, remove_err);
            "partially uploaded"
        }
    };
    session.reply.add(e.reply_code(), e.to_string());
    session.reply.append(format!("{} {}", arg, outcome));
}
