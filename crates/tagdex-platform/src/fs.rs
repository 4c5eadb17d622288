//! Atomic file writes and optional reads.
//!
//! Persisted documents are written to a sibling temp file, synced, and then
//! renamed over the target while an exclusive lock file is held. A reader
//! therefore sees either the old document or the new one, never a torn write.
//! The lock file is removed again when the writer is dropped, so only the
//! target is left in its directory.

use crate::{PlatformError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Lock timeout for file operations.
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Read a file, distinguishing "absent" from real failures.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
/// Returns error for any other I/O failure (permissions, is a directory, ...).
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlatformError::io(path, e)),
    }
}

/// Atomic file writer.
///
/// Uses temp file + rename pattern for atomic writes.
#[derive(Debug)]
pub struct AtomicFile {
    /// Target path.
    target: PathBuf,
    /// Temp file path.
    temp_path: PathBuf,
    /// Lock file path.
    lock_path: PathBuf,
    /// Lock file handle (RAII: lock released when dropped).
    _lock_handle: File,
}

impl AtomicFile {
    /// Create a new atomic file writer.
    ///
    /// # Errors
    /// Returns error if the parent directory cannot be created or the lock
    /// cannot be acquired.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let temp_path = sibling_with_suffix(&target, "tmp");
        let lock_path = sibling_with_suffix(&target, "lock");

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PlatformError::io(parent, e))?;
        }

        let lock_handle = Self::acquire_lock(&lock_path)?;

        Ok(Self {
            target,
            temp_path,
            lock_path,
            _lock_handle: lock_handle,
        })
    }

    /// Write content atomically.
    ///
    /// # Errors
    /// Returns error if write fails.
    pub fn write(&self, content: &[u8]) -> Result<AtomicWriteResult> {
        debug!(
            target = %self.target.display(),
            size = content.len(),
            "writing atomic file"
        );

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.temp_path)
                .map_err(|e| PlatformError::io(&self.temp_path, e))?;

            file.write_all(content)
                .map_err(|e| PlatformError::io(&self.temp_path, e))?;

            file.sync_all()
                .map_err(|e| PlatformError::io(&self.temp_path, e))?;
        }

        let had_existing = self.target.exists();

        fs::rename(&self.temp_path, &self.target)
            .map_err(|e| PlatformError::io(&self.target, e))?;

        #[cfg(unix)]
        if let Some(parent) = self.target.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(AtomicWriteResult {
            path: self.target.clone(),
            bytes_written: content.len(),
            had_existing,
        })
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        use fs2::FileExt;

        let start = std::time::Instant::now();
        loop {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
                .map_err(|e| PlatformError::io(path, e))?;

            match file.try_lock_exclusive() {
                Ok(()) if is_linked_at(&file, path) => return Ok(file),
                // The previous holder removed the lock file after we opened it.
                Ok(()) => {}
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => return Err(PlatformError::io(path, e)),
            }

            if start.elapsed() > LOCK_TIMEOUT {
                return Err(PlatformError::LockTimeout {
                    path: path.to_path_buf(),
                    timeout_secs: LOCK_TIMEOUT.as_secs(),
                });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.temp_path.exists() {
            warn!(temp = %self.temp_path.display(), "cleaning up orphaned temp file");
            let _ = fs::remove_file(&self.temp_path);
        }
        // Removed while still locked; waiters notice and reopen.
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Whether the open `file` is still the one found at `path`.
#[cfg(unix)]
fn is_linked_at(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_linked_at(_file: &File, path: &Path) -> bool {
    path.exists()
}

/// Result of an atomic write operation.
#[derive(Debug)]
pub struct AtomicWriteResult {
    /// Path that was written.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes_written: usize,
    /// Whether there was an existing file.
    pub had_existing: bool,
}

/// `index.json` -> `index.json.<suffix>`.
fn sibling_with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut path = target.to_path_buf();
    let ext = path
        .extension()
        .map(|e| format!("{}.{suffix}", e.to_string_lossy()))
        .unwrap_or_else(|| suffix.to_string());
    path.set_extension(ext);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_and_replaces() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("index.json");

        let first = AtomicFile::new(&target).unwrap().write(b"one").unwrap();
        assert!(!first.had_existing);
        assert_eq!(first.bytes_written, 3);

        let second = AtomicFile::new(&target).unwrap().write(b"two").unwrap();
        assert!(second.had_existing);
        assert_eq!(fs::read(&target).unwrap(), b"two");
        assert!(!temp.path().join("nested").join("index.json.tmp").exists());
    }

    #[test]
    fn lock_file_is_removed_after_write() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("index.json");

        let writer = AtomicFile::new(&target).unwrap();
        assert!(temp.path().join("index.json.lock").exists());
        writer.write(b"{}").unwrap();
        drop(writer);

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["index.json"]);
    }

    #[test]
    fn concurrent_writers_serialize() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("tags-cache.json");

        let handles: Vec<_> = (0..8u8)
            .map(|n| {
                let target = target.clone();
                std::thread::spawn(move || {
                    AtomicFile::new(&target).unwrap().write(&[b'0' + n]).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fs::read(&target).unwrap().len(), 1);
        assert!(!temp.path().join("tags-cache.json.lock").exists());
    }

    #[test]
    fn read_if_exists_distinguishes_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache.json");
        assert!(read_if_exists(&path).unwrap().is_none());

        fs::write(&path, b"{}").unwrap();
        assert_eq!(read_if_exists(&path).unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn read_if_exists_reports_directories() {
        let temp = TempDir::new().unwrap();
        assert!(read_if_exists(temp.path()).is_err());
    }

    #[test]
    fn sibling_paths() {
        assert_eq!(
            sibling_with_suffix(Path::new("/x/index.json"), "tmp"),
            PathBuf::from("/x/index.json.tmp")
        );
        assert_eq!(
            sibling_with_suffix(Path::new("/x/index"), "lock"),
            PathBuf::from("/x/index.lock")
        );
    }
}
