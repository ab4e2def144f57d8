use crate::core_fs::listing::{short_line, DirectoryEntry};
use crate::core_fs::resolve;
use crate::core_network::datachan::open_data_channel;
use crate::session::Session;
use log::{debug, warn};
use std::path::Path;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ListFlags {
    long: bool,
    all: bool,
}

/// Splits leading `-xyz` words off `args`. Unknown flag letters are ignored.
fn parse_list_args(args: &str, mut flags: ListFlags) -> (ListFlags, &str) {
    let mut rest = args.trim_start();
    while rest.starts_with('-') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        for flag in rest[1..end].chars() {
            match flag {
                'l' => flags.long = true,
                'a' => flags.all = true,
                _ => {}
            }
        }
        rest = rest[end..].trim_start();
    }
    (flags, rest)
}

/// Handles the LIST FTP command. A bare LIST means `LIST -l`; with
/// arguments the format follows the flags given.
pub async fn handle_list_command(session: &mut Session, args: &str) -> std::io::Result<()> {
    let defaults = ListFlags {
        long: args.trim().is_empty(),
        all: false,
    };
    list_directory(session, args, defaults).await
}

/// Handles the NLST FTP command: bare names unless `-l` is given.
pub async fn handle_nlst_command(session: &mut Session, args: &str) -> std::io::Result<()> {
    list_directory(session, args, ListFlags::default()).await
}

/// Streams a directory listing over the data channel.
///
/// Entries are sent in lexicographic order, one line at a time. Entries
/// whose metadata or owner cannot be read are left out of a long listing.
/// The final 226 reply carries the number of lines sent.
async fn list_directory(
    session: &mut Session,
    args: &str,
    defaults: ListFlags,
) -> std::io::Result<()> {
    let (flags, target) = parse_list_args(args, defaults);
    let target = if target.is_empty() { "." } else { target };

    let dir = match resolve(&session.current_dir, target) {
        Ok(dir) => dir,
        Err(e) => {
            session.reply.add(e.reply_code(), e.to_string());
            return Ok(());
        }
    };

    let mut names = match read_names(&dir) {
        Ok(names) => names,
        Err(e) => {
            session
                .reply
                .add(550, format!("Cannot list {}: {}", target, e));
            return Ok(());
        }
    };
    names.retain(|name| flags.all || !name.starts_with('.'));
    names.sort();
    if flags.all {
        names.insert(0, "..".to_string());
        names.insert(0, ".".to_string());
    }

    let mut data = match open_data_channel(session).await {
        Some(data) => data,
        None => return Ok(()),
    };
    session.flush_replies().await?;

    let mut total = 0usize;
    for name in &names {
        let line = if flags.long {
            match long_line(Path::new(&dir), name) {
                Some(line) => line,
                None => continue,
            }
        } else {
            short_line(name)
        };

        if let Err(e) = data.write_all(line.as_bytes()).await {
            warn!("Listing of {} aborted: {}", dir, e);
            session.reply.add(426, format!("Transfer aborted: {}", e));
            return Ok(());
        }
        total += 1;
    }

    let _ = data.shutdown().await;
    debug!("Listed {} entries of {}", total, dir);
    session.reply.add(226, format!("Total {}", total));
    Ok(())
}

fn read_names(dir: &str) -> std::io::Result<Vec<String>> {
    std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect()
}

fn long_line(dir: &Path, name: &str) -> Option<String> {
    let metadata = std::fs::symlink_metadata(dir.join(name)).ok()?;
    DirectoryEntry::from_metadata(name, &metadata).map(|entry| entry.long_line())
}
