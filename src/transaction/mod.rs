//! Versioned transaction log for project changes
//!
//! Every mutating command goes through [`TransactionLog::commit`], so the
//! project is never left half-written and every change is one commit.
//!
//! ## Usage
//!
//! ```ignore
//! let log = TransactionLog::new(&project.root, GitHistory::open(&project.root)?);
//! let outcome = log.commit(|state| {
//!     state.manifest.upsert(entry);
//!     Ok(format!("Added module '{name}'"))
//! })?;
//! ```
//!
//! ## Steps
//!
//! 1. Take the project lock without waiting (`Busy` if held)
//! 2. Load the state and apply the mutation to a copy
//! 3. Render both states; identical bytes mean `Unchanged`
//! 4. Write changed files atomically, delete removed ones
//! 5. Commit exactly the changed paths
//!
//! A failing mutation writes nothing. A failing write or commit restores
//! every touched file from its in-memory backup (automatic via `Drop`).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{CfError, Result};
use crate::history::{CommitId, History};
use crate::project::{ProjectGuard, ProjectState};

/// Result of a transaction that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommitId),
    /// The mutation produced byte-identical files; nothing was written
    Unchanged,
}

impl CommitOutcome {
    #[cfg(test)]
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }
}

/// Commits project mutations to disk and history
#[derive(Debug)]
pub struct TransactionLog<H: History> {
    root: PathBuf,
    history: H,
}

impl<H: History> TransactionLog<H> {
    pub fn new(root: impl Into<PathBuf>, history: H) -> Self {
        Self {
            root: root.into(),
            history,
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Apply `mutation` to the project state and record it
    ///
    /// The mutation returns the commit message. Its errors are returned
    /// unchanged, with nothing written.
    pub fn commit<F>(&self, mutation: F) -> Result<CommitOutcome>
    where
        F: FnOnce(&mut ProjectState) -> Result<String>,
    {
        let _guard = ProjectGuard::acquire_or_busy(&self.root)?;
        self.commit_locked(mutation)
    }

    /// Like [`commit`](Self::commit) for callers already holding the lock
    pub fn commit_locked<F>(&self, mutation: F) -> Result<CommitOutcome>
    where
        F: FnOnce(&mut ProjectState) -> Result<String>,
    {
        let current = ProjectState::load(&self.root)?;
        let mut next = current.clone();
        let message = mutation(&mut next)?;

        let before = render(&current)?;
        let after = render(&next)?;
        let changes = diff(&before, &after);
        if changes.is_empty() {
            tracing::debug!("No changes to commit");
            return Ok(CommitOutcome::Unchanged);
        }

        if matches!(self.history.has_staged_changes(), Ok(true)) {
            tracing::warn!("Staged changes outside cfbuild's files are left out of this commit");
        }

        let mut batch = WriteBatch::new(&self.root);
        for path in &changes {
            match after.get(path) {
                Some(content) => batch.write(path, content)?,
                None => batch.remove(path)?,
            }
        }

        let paths: Vec<PathBuf> = changes.into_iter().collect();
        let id = self.history.commit(&paths, &message).map_err(|e| match e {
            CfError::HistoryWrite { .. } => e,
            other => CfError::HistoryWrite {
                reason: other.to_string(),
            },
        })?;

        batch.commit();
        tracing::info!("{} ({})", message, id.short());
        Ok(CommitOutcome::Committed(id))
    }
}

fn render(state: &ProjectState) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
    state.render().map_err(|e| CfError::CorruptState {
        path: "project state".to_string(),
        reason: e.to_string(),
    })
}

/// Paths whose content differs, including paths present on only one side
fn diff(
    before: &BTreeMap<PathBuf, Vec<u8>>,
    after: &BTreeMap<PathBuf, Vec<u8>>,
) -> BTreeSet<PathBuf> {
    before
        .keys()
        .chain(after.keys())
        .filter(|path| before.get(*path) != after.get(*path))
        .cloned()
        .collect()
}

/// Original content of a touched file (`None` if it did not exist)
#[derive(Debug)]
struct Backup {
    path: PathBuf,
    content: Option<Vec<u8>>,
}

/// File writes that are undone on drop unless committed
#[derive(Debug)]
struct WriteBatch {
    root: PathBuf,
    backups: Vec<Backup>,
    created_dirs: Vec<PathBuf>,
    committed: bool,
}

impl WriteBatch {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            backups: Vec::new(),
            created_dirs: Vec::new(),
            committed: false,
        }
    }

    fn backup(&mut self, path: &Path) -> Result<()> {
        let content = match fs::read(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(CfError::FileReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };
        self.backups.push(Backup {
            path: path.to_path_buf(),
            content,
        });
        Ok(())
    }

    fn write(&mut self, relative: &Path, content: &[u8]) -> Result<()> {
        let path = self.root.join(relative);
        self.backup(&path)?;

        if let Some(parent) = path.parent() {
            self.create_dirs(parent)?;
        }
        write_atomic(&path, content)
    }

    fn remove(&mut self, relative: &Path) -> Result<()> {
        let path = self.root.join(relative);
        self.backup(&path)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CfError::FileWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn create_dirs(&mut self, dir: &Path) -> Result<()> {
        let missing: Vec<PathBuf> = dir
            .ancestors()
            .take_while(|d| !d.exists())
            .map(Path::to_path_buf)
            .collect();
        fs::create_dir_all(dir).map_err(|e| CfError::FileWriteFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        self.created_dirs.extend(missing);
        Ok(())
    }

    fn commit(mut self) {
        self.committed = true;
    }

    fn rollback(&mut self) {
        for backup in self.backups.iter().rev() {
            let result = match &backup.content {
                Some(content) => write_atomic(&backup.path, content),
                None => match fs::remove_file(&backup.path) {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                    _ => Ok(()),
                },
            };
            if let Err(e) = result {
                tracing::warn!("Failed to restore {}: {}", backup.path.display(), e);
            }
        }

        // Deepest first; only directories this batch created and left empty
        for dir in &self.created_dirs {
            let _ = fs::remove_dir(dir);
        }
    }
}

impl Drop for WriteBatch {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!("Rolling back {} file(s)", self.backups.len());
            self.rollback();
        }
    }
}

/// Replace `path` with `content` via a temporary file in the same directory
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|e| write_failed(path, e))?;
    file.write_all(content).map_err(|e| write_failed(path, e))?;
    file.as_file().sync_all().map_err(|e| write_failed(path, e))?;
    file.persist(path).map_err(|e| write_failed(path, e.error))?;
    Ok(())
}

fn write_failed(path: &Path, reason: impl std::fmt::Display) -> CfError {
    CfError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
