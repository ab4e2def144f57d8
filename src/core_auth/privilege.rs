use log::{debug, info};
use nix::unistd::{geteuid, Gid, Uid, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("No system account named {0}")]
    NoSystemAccount(String),

    #[error("Cannot switch from uid {from} to uid {to}")]
    NotPermitted { from: u32, to: u32 },

    #[error("Cannot switch to uid {uid}: {source}")]
    Switch {
        uid: u32,
        #[source]
        source: std::io::Error,
    },
}

/// The uid and gid a session runs with after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub uid: u32,
    pub gid: u32,
}

impl Credentials {
    /// Credentials for a numeric uid. The gid comes from the system
    /// account database, or equals the uid when the account is unnamed.
    pub fn for_uid(uid: u32) -> Self {
        let gid = User::from_uid(Uid::from_raw(uid))
            .ok()
            .flatten()
            .map_or(uid, |user| user.gid.as_raw());
        Self { uid, gid }
    }

    pub fn for_account(name: &str) -> Option<Self> {
        User::from_name(name).ok().flatten().map(|user| Self {
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
        })
    }

    /// Whatever the calling thread currently runs as.
    pub fn current() -> Self {
        Self {
            uid: geteuid().as_raw(),
            gid: nix::unistd::getegid().as_raw(),
        }
    }
}

/// Switches the calling thread to the system account `name`.
///
/// An unprivileged server has nothing to drop, so a missing account is only
/// an error when running as root.
pub fn become_account(name: &str) -> Result<(), PrivilegeError> {
    match Credentials::for_account(name) {
        Some(credentials) => switch_thread_to(credentials),
        None if geteuid().is_root() => Err(PrivilegeError::NoSystemAccount(name.to_string())),
        None => {
            debug!("No system account {}, keeping uid {}", name, geteuid());
            Ok(())
        }
    }
}

/// Permanently switches the calling OS thread, and only that thread, to
/// `credentials`. Supplementary groups are reduced to the primary gid.
///
/// Sessions own their thread, so other sessions and the accept loop keep
/// the server's credentials.
pub fn switch_thread_to(credentials: Credentials) -> Result<(), PrivilegeError> {
    let current = geteuid();
    if current.as_raw() == credentials.uid {
        return Ok(());
    }
    if !current.is_root() {
        return Err(PrivilegeError::NotPermitted {
            from: current.as_raw(),
            to: credentials.uid,
        });
    }

    let switched = thread_setgroups(Gid::from_raw(credentials.gid))
        .and_then(|()| thread_setresgid(Gid::from_raw(credentials.gid)))
        .and_then(|()| thread_setresuid(Uid::from_raw(credentials.uid)));
    switched.map_err(|source| PrivilegeError::Switch {
        uid: credentials.uid,
        source,
    })?;

    info!(
        "Thread {:?} now runs as uid {} gid {}",
        std::thread::current().name(),
        credentials.uid,
        credentials.gid
    );
    Ok(())
}

// The libc wrappers broadcast id changes to every thread of the process;
// the raw syscalls change only the caller.
#[cfg(target_os = "linux")]
fn check(result: nix::libc::c_long) -> std::io::Result<()> {
    if result == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn thread_setgroups(gid: Gid) -> std::io::Result<()> {
    let groups = [gid.as_raw() as nix::libc::gid_t];
    check(unsafe {
        nix::libc::syscall(
            nix::libc::SYS_setgroups,
            groups.len() as nix::libc::c_long,
            groups.as_ptr(),
        )
    })
}

#[cfg(target_os = "linux")]
fn thread_setresgid(gid: Gid) -> std::io::Result<()> {
    let gid = gid.as_raw() as nix::libc::gid_t;
    check(unsafe { nix::libc::syscall(nix::libc::SYS_setresgid, gid, gid, gid) })
}

#[cfg(target_os = "linux")]
fn thread_setresuid(uid: Uid) -> std::io::Result<()> {
    let uid = uid.as_raw() as nix::libc::uid_t;
    check(unsafe { nix::libc::syscall(nix::libc::SYS_setresuid, uid, uid, uid) })
}

#[cfg(not(target_os = "linux"))]
fn thread_setgroups(_gid: Gid) -> std::io::Result<()> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}

#[cfg(not(target_os = "linux"))]
fn thread_setresgid(_gid: Gid) -> std::io::Result<()> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}

#[cfg(not(target_os = "linux"))]
fn thread_setresuid(_uid: Uid) -> std::io::Result<()> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    const NOBODY: u32 = 65534;

    #[test]
    fn test_switch_to_self_is_noop() {
        let me = Credentials::current();
        assert!(switch_thread_to(me).is_ok());
        assert_eq!(Credentials::current(), me);
    }

    #[test]
    fn test_unprivileged_thread_cannot_switch() {
        if geteuid().is_root() {
            return;
        }
        let other = Credentials::for_uid(geteuid().as_raw() + 1);
        assert!(matches!(
            switch_thread_to(other),
            Err(PrivilegeError::NotPermitted { .. })
        ));
    }

    #[test]
    fn test_missing_account() {
        let result = become_account("no-such-account-here");
        if geteuid().is_root() {
            assert!(matches!(result, Err(PrivilegeError::NoSystemAccount(_))));
        } else {
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_switch_affects_only_the_calling_thread() {
        if !geteuid().is_root() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("secret");
        std::fs::write(&secret, b"root only").unwrap();
        std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o600)).unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        let path = secret.clone();
        let outcome = std::thread::spawn(move || {
            switch_thread_to(Credentials::for_uid(NOBODY)).unwrap();
            let euid = geteuid().as_raw();
            let open = std::fs::File::open(&path).map(|_| ()).map_err(|e| e.kind());
            // Dropped for good: root cannot be regained.
            let back = switch_thread_to(Credentials::for_uid(0));
            (euid, open, back.is_err())
        })
        .join()
        .unwrap();

        assert_eq!(outcome.0, NOBODY);
        assert_eq!(outcome.1, Err(std::io::ErrorKind::PermissionDenied));
        assert!(outcome.2);
        assert!(geteuid().is_root());
        assert!(std::fs::File::open(&secret).is_ok());
    }
}
