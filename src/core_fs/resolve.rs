use crate::core_error::FtpError;
use std::path::Path;

/// Joins a client-supplied name onto the working directory.
///
/// Names starting with a separator are absolute and ignore `wd`.
fn join(wd: &str, name: &str) -> String {
    if name.starts_with('/') || name.starts_with('\\') {
        name.to_string()
    } else {
        let mut joined = String::with_capacity(wd.len() + 1 + name.len());
        joined.push_str(wd);
        if !wd.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(name);
        joined
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Maps `name` to a canonical, symlink-free path anchored at `wd`.
///
/// No containment is enforced: `..` and absolute names reach whatever the
/// filesystem permissions allow.
pub fn resolve(wd: &str, name: &str) -> Result<String, FtpError> {
    let joined = join(wd, name);
    std::fs::canonicalize(&joined)
        .map(|path| normalize(&path))
        .map_err(|_| FtpError::NotFound(name.to_string()))
}

/// Like [`resolve`], for a target that may not exist yet.
///
/// The parent directory must exist; the final component is appended as given.
pub fn resolve_new(wd: &str, name: &str) -> Result<String, FtpError> {
    let joined = join(wd, name);
    let path = Path::new(&joined);
    let (parent, file_name) = match (path.parent(), path.file_name()) {
        (Some(parent), Some(file_name)) => (parent, file_name),
        _ => return resolve(wd, name),
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new("/")
    } else {
        parent
    };
    let parent =
        std::fs::canonicalize(parent).map_err(|_| FtpError::NotFound(name.to_string()))?;
    Ok(normalize(&parent.join(file_name)))
}
