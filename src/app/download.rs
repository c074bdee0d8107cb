use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::app::constants::DOWNLOAD_CHUNK_BYTES;
use crate::app::helpers::{display_name, join_remote};
use crate::app::remote_fs::RemoteFs;
use crate::error::DownloadError;
use crate::model::DownloadTask;

/// Copies `remote_dir/file_name` into `local_dest_dir`, replacing any file of the same name.
///
/// `progress` sees the task after every chunk. A failed copy leaves the
/// partial local file behind; removing it is up to the caller.
pub(crate) fn download_file(
    fs: &dyn RemoteFs,
    remote_dir: &str,
    file_name: &str,
    local_dest_dir: &Path,
    progress: &mut dyn FnMut(&DownloadTask),
) -> Result<u64, DownloadError> {
    let source_path = join_remote(remote_dir, file_name);
    let destination_path = local_dest_dir.join(display_name(&source_path));

    let mut remote = fs.open(&source_path).map_err(|source| DownloadError::OpenRemote {
        path: source_path.clone(),
        source,
    })?;
    let mut local = File::create(&destination_path).map_err(|source| DownloadError::CreateLocal {
        path: destination_path.clone(),
        source,
    })?;

    let mut task = DownloadTask {
        source_path,
        destination_path,
        bytes_transferred: 0,
    };
    let mut buffer = vec![0u8; DOWNLOAD_CHUNK_BYTES];
    loop {
        let read = match remote.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(copy_failed(&task, source)),
        };
        local
            .write_all(&buffer[..read])
            .map_err(|source| copy_failed(&task, source))?;
        task.bytes_transferred += read as u64;
        progress(&task);
    }
    local.flush().map_err(|source| copy_failed(&task, source))?;
    Ok(task.bytes_transferred)
}

fn copy_failed(task: &DownloadTask, source: std::io::Error) -> DownloadError {
    DownloadError::CopyFailed {
        path: task.destination_path.clone(),
        bytes_written: task.bytes_transferred,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::remote_fs::MockRemoteFs;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(label: &str) -> PathBuf {
        let mut base = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        base.push(format!("sftp-browse-download-{label}-{nanos}"));
        fs::create_dir_all(&base).unwrap();
        base
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn copies_every_byte() {
        let dest = temp_dir("full");
        let content = payload(DOWNLOAD_CHUNK_BYTES * 3 + 17);
        let mut fs_mock = MockRemoteFs::default();
        fs_mock.add_file("/srv/data.bin", &content);
        let mut seen = Vec::new();
        let written = download_file(&fs_mock, "/srv", "data.bin", &dest, &mut |task| {
            seen.push(task.bytes_transferred)
        })
        .unwrap();
        assert_eq!(written, content.len() as u64);
        assert_eq!(fs::read(dest.join("data.bin")).unwrap(), content);
        assert_eq!(seen.len(), 4);
        assert_eq!(seen.last().copied(), Some(written));
        let _ = fs::remove_dir_all(dest);
    }

    #[test]
    fn empty_remote_file_creates_empty_local_file() {
        let dest = temp_dir("empty");
        let mut fs_mock = MockRemoteFs::default();
        fs_mock.add_file("/srv/empty", b"");
        assert_eq!(download_file(&fs_mock, "/srv", "empty", &dest, &mut |_| {}).unwrap(), 0);
        assert_eq!(fs::metadata(dest.join("empty")).unwrap().len(), 0);
        let _ = fs::remove_dir_all(dest);
    }

    #[test]
    fn overwrites_existing_local_file() {
        let dest = temp_dir("overwrite");
        fs::write(dest.join("notes.txt"), b"a much longer stale local copy").unwrap();
        let mut fs_mock = MockRemoteFs::default();
        fs_mock.add_file("/home/user/notes.txt", b"fresh");
        download_file(&fs_mock, "/home/user", "notes.txt", &dest, &mut |_| {}).unwrap();
        assert_eq!(fs::read(dest.join("notes.txt")).unwrap(), b"fresh");
        let _ = fs::remove_dir_all(dest);
    }

    #[test]
    fn copy_failure_leaves_partial_file() {
        let dest = temp_dir("partial");
        let mut fs_mock = MockRemoteFs::default();
        fs_mock.add_file("/srv/big.iso", &payload(10_000));
        fs_mock.fail_read_after("/srv/big.iso", 5_000);
        let err = download_file(&fs_mock, "/srv", "big.iso", &dest, &mut |_| {}).unwrap_err();
        match err {
            DownloadError::CopyFailed { bytes_written, .. } => assert_eq!(bytes_written, 5_000),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(fs::metadata(dest.join("big.iso")).unwrap().len(), 5_000);
        let _ = fs::remove_dir_all(dest);
    }

    #[test]
    fn open_failure_creates_nothing() {
        let dest = temp_dir("open");
        let mut fs_mock = MockRemoteFs::default();
        fs_mock.add_file("/srv/secret", b"x");
        fs_mock.fail_open("/srv/secret");
        let err = download_file(&fs_mock, "/srv", "secret", &dest, &mut |_| {}).unwrap_err();
        assert!(matches!(err, DownloadError::OpenRemote { ref path, .. } if path == "/srv/secret"));
        assert!(!dest.join("secret").exists());
        let _ = fs::remove_dir_all(dest);
    }

    #[test]
    fn missing_destination_dir_is_create_error() {
        let dest = temp_dir("create").join("missing");
        let mut fs_mock = MockRemoteFs::default();
        fs_mock.add_file("/srv/a", b"x");
        let err = download_file(&fs_mock, "/srv", "a", &dest, &mut |_| {}).unwrap_err();
        assert!(matches!(err, DownloadError::CreateLocal { .. }));
    }
}
