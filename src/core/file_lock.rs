//! Advisory flock(2) guarding read-modify-write of the config document.

use crate::error::{Result, ZimanError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// An exclusive file lock. Released on drop (file close releases flock).
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Acquire an exclusive lock, blocking until available.
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        if !try_lock(&file, path)? {
            tracing::debug!(lock = %path.display(), "waiting for config lock");
            file.lock_exclusive().map_err(|e| lock_err(path, e))?;
        }
        Ok(Self { _file: file })
    }
}

fn try_lock(file: &File, path: &Path) -> Result<bool> {
    match file.try_lock_exclusive() {
        Ok(()) => Ok(true),
        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
        // fs2 on Linux may return Other instead of WouldBlock
        Err(ref e) if e.raw_os_error() == Some(11) => Ok(false), // EAGAIN
        Err(e) => Err(lock_err(path, e)),
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| ZimanError::from_io("open lock file", path, e))
}

fn lock_err(path: &Path, e: std::io::Error) -> ZimanError {
    ZimanError::from_io("acquire lock", path, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exclusive_lock_acquired() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("config.json.lock");
        let lock = FileLock::exclusive(&lock_path).unwrap();
        assert!(lock_path.exists());
        drop(lock);
    }

    fn held_elsewhere(path: &Path) -> bool {
        let other = OpenOptions::new().write(true).open(path).unwrap();
        !try_lock(&other, path).unwrap()
    }

    #[test]
    fn test_lock_excludes_other_handles() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("config.json.lock");
        let _lock = FileLock::exclusive(&lock_path).unwrap();
        assert!(held_elsewhere(&lock_path));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("config.json.lock");
        {
            let _lock = FileLock::exclusive(&lock_path).unwrap();
        }
        assert!(!held_elsewhere(&lock_path));
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join("absent").join("config.json.lock");
        assert!(matches!(
            FileLock::exclusive(&lock_path),
            Err(ZimanError::NotFound { .. })
        ));
    }
}
