use crate::core_transfer::stats::TransferStats;
use std::io;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Error reading file: {0}")]
    FileRead(#[source] std::io::Error),

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Transfer aborted: {0}")]
    DataWrite(#[source] std::io::Error),

    #[error("Error reading from data connection: {0}")]
    DataRead(#[source] std::io::Error),

    #[error("Error writing file: {0}")]
    FileWrite(#[source] std::io::Error),
}

impl TransferError {
    pub fn reply_code(&self) -> u16 {
        match self {
            TransferError::FileRead(_) | TransferError::UnexpectedEof => 451,
            TransferError::DataWrite(_) => 426,
            TransferError::DataRead(_) => 451,
            TransferError::FileWrite(_) => 450,
        }
    }
}

fn stalled(idle: Duration) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("no progress for {:?}", idle))
}

/// Copies exactly `remaining` bytes from `file` to `data`, `chunk` bytes at a time.
///
/// A file that ends early is an error, not a short transfer. Each write to
/// the data channel must complete within `idle`.
pub async fn send_file<R, W>(
    file: &mut R,
    data: &mut W,
    remaining: u64,
    chunk: usize,
    idle: Duration,
) -> Result<TransferStats, TransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let started = Instant::now();
    let mut buf = vec![0u8; chunk.max(1)];
    let mut sent: u64 = 0;

    while sent < remaining {
        let want = (remaining - sent).min(buf.len() as u64) as usize;
        let n = file
            .read(&mut buf[..want])
            .await
            .map_err(TransferError::FileRead)?;
        if n == 0 {
            return Err(TransferError::UnexpectedEof);
        }
        timeout(idle, data.write_all(&buf[..n]))
            .await
            .map_err(|_| TransferError::DataWrite(stalled(idle)))?
            .map_err(TransferError::DataWrite)?;
        sent += n as u64;
    }
    timeout(idle, data.flush())
        .await
        .map_err(|_| TransferError::DataWrite(stalled(idle)))?
        .map_err(TransferError::DataWrite)?;

    Ok(TransferStats {
        bytes: sent,
        elapsed: started.elapsed(),
    })
}

/// Copies `data` into `file` until the client closes the data connection.
/// A client that sends nothing for `idle` fails the transfer.
pub async fn receive_file<R, W>(
    data: &mut R,
    file: &mut W,
    chunk: usize,
    idle: Duration,
) -> Result<TransferStats, TransferError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let started = Instant::now();
    let mut buf = vec![0u8; chunk.max(1)];
    let mut received: u64 = 0;

    loop {
        let n = timeout(idle, data.read(&mut buf))
            .await
            .map_err(|_| TransferError::DataRead(stalled(idle)))?
            .map_err(TransferError::DataRead)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .await
            .map_err(TransferError::FileWrite)?;
        received += n as u64;
    }
    file.flush().await.map_err(TransferError::FileWrite)?;

    Ok(TransferStats {
        bytes: received,
        elapsed: started.elapsed(),
    })
}
