use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::Local;

pub(crate) const ROOT_DIR: &str = "/";
pub(crate) const PARENT_NAME: &str = "..";

const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_DIR: u32 = 0o040000;
const MODE_SYMLINK: u32 = 0o120000;
const MODE_FIFO: u32 = 0o010000;
const MODE_SOCKET: u32 = 0o140000;
const MODE_CHAR: u32 = 0o020000;
const MODE_BLOCK: u32 = 0o060000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) user: String,
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Endpoint {
    pub(crate) fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn label(&self) -> String {
        if self.port == 22 {
            format!("{}@{}", self.user, self.host)
        } else {
            format!("{}@{}:{}", self.user, self.host, self.port)
        }
    }
}

/// One record of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteEntry {
    pub(crate) name: String,
    pub(crate) is_dir: bool,
    pub(crate) size: u64,
    /// Seconds since the epoch, when the server reports it.
    pub(crate) modified: Option<u64>,
    pub(crate) permissions: String,
    pub(crate) is_parent: bool,
}

impl RemoteEntry {
    pub(crate) fn parent_marker() -> Self {
        Self {
            name: PARENT_NAME.to_string(),
            is_dir: true,
            size: 0,
            modified: None,
            permissions: String::new(),
            is_parent: true,
        }
    }

    pub(crate) fn from_stat(name: String, size: Option<u64>, perm: Option<u32>, mtime: Option<u64>) -> Self {
        let perm = perm.unwrap_or(0);
        Self {
            name,
            is_dir: perm & MODE_TYPE_MASK == MODE_DIR,
            size: size.unwrap_or(0),
            modified: mtime,
            permissions: permission_string(perm),
            is_parent: false,
        }
    }

    pub(crate) fn is_hidden(&self) -> bool {
        !self.is_parent && self.name.starts_with('.')
    }
}

/// The directory currently shown: its canonical path and the entries of one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NavigationState {
    pub(crate) current_path: String,
    pub(crate) items: Vec<RemoteEntry>,
}

impl NavigationState {
    /// Builds the state for `path`, putting the parent marker first unless `path` is the root.
    pub(crate) fn from_listing(path: String, mut entries: Vec<RemoteEntry>) -> Self {
        entries.retain(|entry| !entry.is_parent && entry.name != "." && entry.name != PARENT_NAME);
        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        let mut items = Vec::with_capacity(entries.len() + 1);
        if path != ROOT_DIR {
            items.push(RemoteEntry::parent_marker());
        }
        items.extend(entries);
        Self {
            current_path: path,
            items,
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        self.current_path == ROOT_DIR
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadTask {
    pub(crate) source_path: String,
    pub(crate) destination_path: PathBuf,
    pub(crate) bytes_transferred: u64,
}

/// Renders a unix mode the way `ls -l` does, e.g. `drwxr-xr-x`.
pub(crate) fn permission_string(mode: u32) -> String {
    let kind = match mode & MODE_TYPE_MASK {
        MODE_DIR => 'd',
        MODE_SYMLINK => 'l',
        MODE_FIFO => 'p',
        MODE_SOCKET => 's',
        MODE_CHAR => 'c',
        MODE_BLOCK => 'b',
        _ => '-',
    };
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

pub(crate) fn format_mod_time(ts: u64) -> String {
    let dt = chrono::DateTime::<Local>::from(SystemTime::UNIX_EPOCH + Duration::from_secs(ts));
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
