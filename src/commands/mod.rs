//! Command implementations for the cfbuild CLI

pub mod add;
pub mod build;
pub mod info;
pub mod init;
pub mod input;
pub mod list;
pub mod remove;
pub mod validate;
pub mod version;

use std::path::PathBuf;

use console::Style;

use crate::error::Result;
use crate::project::Project;
use crate::transaction::CommitOutcome;

/// Locate the project from `--project` or the current directory
fn find_project(project: Option<PathBuf>) -> Result<Project> {
    Project::discover(project.as_deref())
}

/// Print the outcome of a mutating command
fn report_outcome(outcome: &CommitOutcome, unchanged: &str) {
    match outcome {
        CommitOutcome::Committed(id) => {
            println!("{} {}", Style::new().green().bold().apply_to("Committed"), id.short());
        }
        CommitOutcome::Unchanged => println!("{unchanged}"),
    }
}
