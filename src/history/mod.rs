//! Project history
//!
//! Every change to a project is recorded as one commit. The transaction
//! log only needs the small capability below, which keeps it testable
//! with a fake backend; [`GitHistory`] is the real one.

pub mod git;

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

pub use git::GitHistory;

/// Identifier of a recorded change (a git commit SHA for [`GitHistory`])
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    /// First 7 characters, as git prints them
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only record of project changes
pub trait History {
    /// Stage exactly `paths` (relative to the project root; missing files
    /// are staged as deletions) and record them as one change
    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<CommitId>;

    /// The latest change, or `None` before the first commit
    fn current_head(&self) -> Result<Option<CommitId>>;

    /// Whether changes are staged but not committed
    fn has_staged_changes(&self) -> Result<bool>;

    /// Whether tracked files differ from the index, or untracked files exist
    fn has_working_changes(&self) -> Result<bool>;
}
