use crate::core_fs::resolve;
use crate::core_network::datachan::open_data_channel;
use crate::core_transfer::send_file;
use crate::session::Session;
use log::{error, info, warn};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

const OFFSET_RESET: &str = "Restart offset reset to 0";

/// Handles the RETR (Retrieve) FTP command.
///
/// Streams the file over the data channel set up by the last PORT or PASV,
/// starting at the pending REST offset. The offset is consumed by every
/// attempt, whether or not it succeeds.
///
/// # Arguments
///
/// * `session` - The session issuing the command.
/// * `arg` - The name of the file to retrieve.
///
/// # Returns
///
/// `Err` only when the control channel fails while flushing the 150 reply.
pub async fn handle_retr_command(session: &mut Session, arg: &str) -> std::io::Result<()> {
    if arg.is_empty() {
        warn!("RETR command received with no arguments");
        session.reply.add(501, "Missing file name");
        return Ok(());
    }

    let offset = session.take_restart_offset();

    let path = match resolve(&session.current_dir, arg) {
        Ok(path) => path,
        Err(e) => {
            session.reply.add(e.reply_code(), e.to_string());
            return Ok(());
        }
    };

    let metadata = match std::fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            session
                .reply
                .add(550, format!("Cannot open {}: {}", arg, e));
            return Ok(());
        }
    };
    let size = metadata.len();

    if offset > size {
        session.reply.add(
            451,
            format!(
                "Restart offset {} is larger than file size {}\n{}",
                offset, size, OFFSET_RESET
            ),
        );
        return Ok(());
    }

    if !metadata.is_file() {
        session.reply.add(450, "Not a regular file");
        return Ok(());
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(file) => File::from_std(file),
        Err(e) => {
            session
                .reply
                .add(550, format!("Cannot open {}: {}", arg, e));
            return Ok(());
        }
    };

    let mut data = match open_data_channel(session).await {
        Some(data) => data,
        None => return Ok(()),
    };
    session.flush_replies().await?;

    if offset == size {
        session.reply.add(226, "No data to transfer");
        if offset > 0 {
            session.reply.append(OFFSET_RESET);
        }
        let _ = data.shutdown().await;
        return Ok(());
    }

    if offset > 0 {
        if let Err(e) = file.seek(SeekFrom::Start(offset)).await {
            session
                .reply
                .add(451, format!("Cannot seek to offset {}: {}", offset, e));
            session.reply.append(OFFSET_RESET);
            let _ = data.shutdown().await;
            return Ok(());
        }
    }

    let sent = send_file(
        &mut file,
        &mut data,
        size - offset,
        session.chunk_size,
        session.idle_timeout,
    )
    .await;
    match sent {
        Ok(stats) => {
            info!("Sent {} to {}: {}", path, session.peer_addr, stats);
            session
                .reply
                .add(226, format!("Transfer complete ({})", stats));
        }
        Err(e) => {
            error!("Sending {} failed: {}", path, e);
            session.reply.add(e.reply_code(), e.to_string());
        }
    }
    if offset > 0 {
        session.reply.append(OFFSET_RESET);
    }
    let _ = data.shutdown().await;
    Ok(())
}
