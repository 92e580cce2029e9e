//! Git-backed project history
//!
//! The project directory may be the repository root or a subdirectory of
//! a larger repository; paths are translated accordingly and status
//! checks are limited to the project directory.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, Signature, Status, StatusOptions};

use crate::error::{CfError, Result};
use crate::history::{CommitId, History};

/// Identity used when git has no `user.name`/`user.email` configured
const FALLBACK_NAME: &str = "cfbuild";
const FALLBACK_EMAIL: &str = "cfbuild@localhost";

pub struct GitHistory {
    repo: Repository,
    /// Project root relative to the repository work directory
    prefix: PathBuf,
}

impl std::fmt::Debug for GitHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHistory")
            .field("repo", &self.repo.path())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl GitHistory {
    /// Open the repository containing `root`
    pub fn open(root: &Path) -> Result<Self> {
        let repo = Repository::discover(root).map_err(|e| CfError::HistoryWrite {
            reason: format!("{} is not inside a git repository: {}", root.display(), e.message()),
        })?;
        Self::from_repo(repo, root)
    }

    /// Open the repository containing `root`, creating one at `root` if none
    pub fn open_or_init(root: &Path) -> Result<Self> {
        match Repository::discover(root) {
            Ok(repo) => Self::from_repo(repo, root),
            Err(_) => {
                tracing::info!("Initializing git repository in {}", root.display());
                let repo = Repository::init(root)?;
                Self::from_repo(repo, root)
            }
        }
    }

    fn from_repo(repo: Repository, root: &Path) -> Result<Self> {
        let workdir = repo.workdir().ok_or_else(|| CfError::HistoryWrite {
            reason: "bare repositories are not supported".to_string(),
        })?;

        let workdir = dunce::canonicalize(workdir)?;
        let root = dunce::canonicalize(root)?;
        let prefix = root
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| CfError::HistoryWrite {
                reason: format!("{} is outside {}", root.display(), workdir.display()),
            })?;

        Ok(Self { repo, prefix })
    }

    fn repo_path(&self, path: &Path) -> PathBuf {
        self.prefix.join(path)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }

    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `paths` from the work directory to `index`
    fn stage(&self, index: &mut git2::Index, paths: &[PathBuf]) -> Result<()> {
        let workdir = self.repo.workdir().unwrap_or_else(|| Path::new("."));
        for path in paths {
            let repo_path = self.repo_path(path);
            if workdir.join(&repo_path).is_file() {
                index.add_path(&repo_path)?;
            } else {
                index.remove_path(&repo_path)?;
            }
        }
        Ok(())
    }

    /// Bring the on-disk index in line for the committed paths
    fn sync_index(&self, paths: &[PathBuf]) -> Result<()> {
        let mut index = self.repo.index()?;
        index.read(true)?;
        self.stage(&mut index, paths)?;
        index.write()?;
        Ok(())
    }

    fn statuses_match(&self, mask: Status) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        if !self.prefix.as_os_str().is_empty() {
            options.pathspec(self.prefix.as_path());
        }

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.iter().any(|entry| entry.status().intersects(mask)))
    }
}

impl History for GitHistory {
    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<CommitId> {
        let parent = self.head_commit()?;

        // Build the tree from HEAD plus our paths only, so anything else the
        // user has staged stays out of the commit.
        let mut index = self.repo.index()?;
        if let Some(parent) = &parent {
            index.read_tree(&parent.tree()?)?;
        } else {
            index.clear()?;
        }
        self.stage(&mut index, paths)?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let sig = self.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        // HEAD has moved; from here on a failure must not undo the files
        if let Err(e) = self.sync_index(paths) {
            tracing::warn!("Committed {} but could not update the git index: {}", oid, e);
        }

        tracing::debug!("Committed {} ({} paths): {}", oid, paths.len(), message);
        Ok(CommitId(oid.to_string()))
    }

    fn current_head(&self) -> Result<Option<CommitId>> {
        Ok(self
            .head_commit()?
            .map(|commit| CommitId(commit.id().to_string())))
    }

    fn has_staged_changes(&self) -> Result<bool> {
        self.statuses_match(
            Status::INDEX_NEW
                | Status::INDEX_MODIFIED
                | Status::INDEX_DELETED
                | Status::INDEX_RENAMED
                | Status::INDEX_TYPECHANGE,
        )
    }

    fn has_working_changes(&self) -> Result<bool> {
        self.statuses_match(
            Status::WT_NEW
                | Status::WT_MODIFIED
                | Status::WT_DELETED
                | Status::WT_RENAMED
                | Status::WT_TYPECHANGE,
        )
    }
}
