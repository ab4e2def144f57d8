use chrono::{DateTime, Local};
use std::fs::Metadata;
use std::os::unix::fs::{FileTypeExt, MetadataExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Block,
    Char,
    Other,
}

impl EntryKind {
    fn from_metadata(metadata: &Metadata) -> Self {
        let ft = metadata.file_type();
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_file() {
            EntryKind::Regular
        } else if ft.is_block_device() {
            EntryKind::Block
        } else if ft.is_char_device() {
            EntryKind::Char
        } else {
            EntryKind::Other
        }
    }

    fn symbol(self) -> char {
        match self {
            EntryKind::Regular => '-',
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
            EntryKind::Block => 'b',
            EntryKind::Char => 'c',
            EntryKind::Other => '-',
        }
    }
}

/// One line of a long-format listing. Built per request, never cached.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    pub mode: u32,
    pub nlink: u64,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl DirectoryEntry {
    /// Builds an entry from metadata, or `None` when owner or group cannot be named.
    pub fn from_metadata(name: &str, metadata: &Metadata) -> Option<Self> {
        let owner = user_name(metadata.uid())?;
        let group = group_name(metadata.gid())?;
        let modified: DateTime<Local> = metadata.modified().ok()?.into();

        Some(Self {
            name: name.to_string(),
            kind: EntryKind::from_metadata(metadata),
            mode: metadata.mode(),
            nlink: metadata.nlink(),
            owner,
            group,
            size: metadata.size(),
            modified,
        })
    }

    pub fn permissions(&self) -> String {
        permission_string(self.kind, self.mode)
    }

    /// `drwxr-xr-x   2	owner	group    4096 2024/01/31 12:00:00 name`
    pub fn long_line(&self) -> String {
        format!(
            "{:10} {:3}\t{}\t{} {:7} {} {}\r\n",
            self.permissions(),
            self.nlink,
            self.owner,
            self.group,
            self.size,
            self.modified.format("%Y/%m/%d %H:%M:%S"),
            self.name
        )
    }
}

pub fn permission_string(kind: EntryKind, mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];

    let mut perms = String::with_capacity(10);
    perms.push(kind.symbol());
    for (bit, symbol) in BITS {
        perms.push(if mode & bit != 0 { symbol } else { '-' });
    }
    perms
}

pub fn short_line(name: &str) -> String {
    format!("{}\r\n", name)
}

fn user_name(uid: u32) -> Option<String> {
    use nix::unistd::{Uid, User};
    User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name)
}

fn group_name(gid: u32) -> Option<String> {
    use nix::unistd::{Gid, Group};
    Group::from_gid(Gid::from_raw(gid)).ok().flatten().map(|g| g.name)
}
