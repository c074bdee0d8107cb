use std::io::{self, Read};
use std::path::Path;

use crate::model::{PARENT_NAME, RemoteEntry};

#[cfg(test)]
use std::collections::{HashMap, HashSet};

/// The remote filesystem operations browsing and downloading need.
pub(crate) trait RemoteFs {
    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteEntry>>;
    fn realpath(&self, path: &str) -> io::Result<String>;
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;
}

impl RemoteFs for ssh2::Sftp {
    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteEntry>> {
        let mut entries = Vec::new();
        for (child, stat) in self.readdir(Path::new(path))? {
            let name = child
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("/"));
            if name == "." || name == PARENT_NAME {
                continue;
            }
            entries.push(RemoteEntry::from_stat(name, stat.size, stat.perm, stat.mtime));
        }
        Ok(entries)
    }

    fn realpath(&self, path: &str) -> io::Result<String> {
        let resolved = ssh2::Sftp::realpath(self, Path::new(path))?;
        Ok(resolved.to_string_lossy().into_owned())
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = ssh2::Sftp::open(self, Path::new(path))?;
        Ok(Box::new(file))
    }
}

/// In-memory remote tree for tests. Paths are absolute and already clean.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockRemoteFs {
    dirs: HashMap<String, Vec<RemoteEntry>>,
    files: HashMap<String, Vec<u8>>,
    list_errors: HashSet<String>,
    open_errors: HashSet<String>,
    fail_reads_after: HashMap<String, usize>,
    list_calls: std::cell::Cell<usize>,
}

#[cfg(test)]
impl MockRemoteFs {
    /// `/home/user` holding `docs/`, `notes.txt` and `.profile`.
    pub(crate) fn with_home() -> Self {
        let dir = |name: &str| RemoteEntry::from_stat(name.to_string(), Some(4096), Some(0o040755), Some(0));
        let file = |name: &str, size: u64| {
            RemoteEntry::from_stat(name.to_string(), Some(size), Some(0o100644), Some(0))
        };
        let mut fs = Self::default();
        fs.add_dir("/", vec![dir("home")]);
        fs.add_dir("/home", vec![dir("user")]);
        fs.add_dir(
            "/home/user",
            vec![dir("docs"), file("notes.txt", 12), file(".profile", 3)],
        );
        fs.add_dir("/home/user/docs", vec![]);
        fs.add_file("/home/user/notes.txt", b"hello remote");
        fs.add_file("/home/user/.profile", b"x=1");
        fs
    }

    pub(crate) fn add_dir(&mut self, path: &str, entries: Vec<RemoteEntry>) {
        self.dirs.insert(path.to_string(), entries);
    }

    pub(crate) fn add_file(&mut self, path: &str, content: &[u8]) {
        self.files.insert(path.to_string(), content.to_vec());
    }

    pub(crate) fn fail_list(&mut self, path: &str) {
        self.list_errors.insert(path.to_string());
    }

    pub(crate) fn fail_open(&mut self, path: &str) {
        self.open_errors.insert(path.to_string());
    }

    pub(crate) fn fail_read_after(&mut self, path: &str, bytes: usize) {
        self.fail_reads_after.insert(path.to_string(), bytes);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.get()
    }
}

#[cfg(test)]
impl RemoteFs for MockRemoteFs {
    fn list_dir(&self, path: &str) -> io::Result<Vec<RemoteEntry>> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.list_errors.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }

    fn realpath(&self, path: &str) -> io::Result<String> {
        let clean = crate::app::helpers::clean_remote_path(path);
        if self.dirs.contains_key(&clean) || self.files.contains_key(&clean) || self.list_errors.contains(&clean) {
            Ok(clean)
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        if self.open_errors.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        let content = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
        match self.fail_reads_after.get(path) {
            Some(limit) => Ok(Box::new(FailingReader {
                inner: io::Cursor::new(content.as_slice()),
                remaining: *limit,
            })),
            None => Ok(Box::new(io::Cursor::new(content.as_slice()))),
        }
    }
}

/// Serves `remaining` bytes, then errors.
#[cfg(test)]
struct FailingReader<'a> {
    inner: io::Cursor<&'a [u8]>,
    remaining: usize,
}

#[cfg(test)]
impl Read for FailingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "connection lost"));
        }
        let limit = buf.len().min(self.remaining);
        let read = self.inner.read(&mut buf[..limit])?;
        self.remaining -= read;
        Ok(read)
    }
}
