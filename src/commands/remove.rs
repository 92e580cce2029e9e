//! Remove command implementation

use std::path::PathBuf;

use crate::cli::RemoveArgs;
use crate::commands::{find_project, report_outcome};
use crate::error::Result;
use crate::operations::remove_modules;

/// Run remove command
pub fn run(project: Option<PathBuf>, args: RemoveArgs) -> Result<()> {
    let project = find_project(project)?;
    let outcome = remove_modules(&project, &args.modules)?;
    report_outcome(&outcome, "Nothing to remove.");
    Ok(())
}
