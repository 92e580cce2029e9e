//! Project locking
//!
//! One advisory lock file per project serializes every command that reads
//! or writes project state. The lock file itself is ignored by git and is
//! left in place after release.

use std::path::{Path, PathBuf};

use fslock::LockFile;

use crate::error::{CfError, Result};

/// Lock file name, relative to the project root
pub const LOCK_FILE: &str = ".cfbuild.lock";

/// RAII guard for the project lock
///
/// Acquires an advisory file lock on creation and releases it on drop.
#[derive(Debug)]
pub struct ProjectGuard {
    lock: LockFile,
    lock_path: PathBuf,
}

impl ProjectGuard {
    /// Wait for the lock
    pub fn acquire(root: &Path) -> Result<Self> {
        let (mut lock, lock_path) = open_lock(root)?;
        lock.lock().map_err(|e| CfError::IoError {
            message: format!("Failed to lock {}: {}", lock_path.display(), e),
        })?;
        tracing::trace!("Acquired {}", lock_path.display());
        Ok(Self { lock, lock_path })
    }

    /// Take the lock if it is free
    pub fn try_acquire(root: &Path) -> Result<Option<Self>> {
        let (mut lock, lock_path) = open_lock(root)?;
        let acquired = lock.try_lock().map_err(|e| CfError::IoError {
            message: format!("Failed to lock {}: {}", lock_path.display(), e),
        })?;

        if acquired {
            tracing::trace!("Acquired {}", lock_path.display());
            Ok(Some(Self { lock, lock_path }))
        } else {
            Ok(None)
        }
    }

    /// Take the lock or fail with `Busy`
    pub fn acquire_or_busy(root: &Path) -> Result<Self> {
        Self::try_acquire(root)?.ok_or_else(|| CfError::Busy {
            path: root.display().to_string(),
        })
    }
}

fn open_lock(root: &Path) -> Result<(LockFile, PathBuf)> {
    if !root.is_dir() {
        return Err(CfError::ProjectNotFound {
            path: root.display().to_string(),
        });
    }

    let lock_path = root.join(LOCK_FILE);
    let lock = LockFile::open(&lock_path).map_err(|e| CfError::IoError {
        message: format!("Failed to open lock file {}: {}", lock_path.display(), e),
    })?;
    Ok((lock, lock_path))
}

impl Drop for ProjectGuard {
    fn drop(&mut self) {
        let _ = self.lock.unlock();
        tracing::trace!("Released {}", self.lock_path.display());
    }
}
