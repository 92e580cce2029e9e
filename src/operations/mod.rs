//! Operations behind the cfbuild commands
//!
//! This module provides high-level operations that coordinate:
//! - Project: locating the project and loading its state
//! - Index: looking up module descriptors
//! - Resolver: dependency resolution and build order
//! - Transaction log: one commit per mutating command
//! - Build merger: producing the output tree
//!
//! Operations return data; the commands in `commands/` print it.

pub mod add;
pub mod build;
pub mod info;
pub mod init;
pub mod input;
pub mod list;
pub mod remove;

use std::path::Path;

use crate::config::{ModuleIndex, load_for_project};
use crate::error::Result;
use crate::history::GitHistory;
use crate::project::ProjectState;
use crate::transaction::TransactionLog;

pub use add::add_modules;
pub use build::{BuildSummary, build_project};
pub use info::{ModuleInfo, module_info};
pub use init::{InitOptions, init_project};
pub use input::{get_input, set_input};
pub use list::{ListedModule, list_modules};
pub use remove::remove_modules;

/// Transaction log over the git history containing `root`
fn transaction_log(root: &Path) -> Result<TransactionLog<GitHistory>> {
    Ok(TransactionLog::new(root, GitHistory::open(root)?))
}

/// Index the project's manifest points at
fn project_index(root: &Path, state: &ProjectState) -> Result<ModuleIndex> {
    load_for_project(root, state.manifest.index.as_ref())
}

/// Quoted, comma-separated names for commit messages
fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `module 'a'` or `modules 'a', 'b'`
fn describe_modules(names: &[String]) -> String {
    let noun = if names.len() == 1 { "module" } else { "modules" };
    format!("{noun} {}", quoted_list(names))
}

#[cfg(test)]
pub(crate) mod test_support;
