//! Add command implementation

use std::path::PathBuf;

use crate::cli::AddArgs;
use crate::commands::{find_project, report_outcome};
use crate::error::Result;
use crate::operations::add_modules;

/// Run add command
pub fn run(project: Option<PathBuf>, args: AddArgs) -> Result<()> {
    let project = find_project(project)?;
    let outcome = add_modules(&project, &args.modules)?;
    report_outcome(&outcome, "Nothing to add: the project already has these modules.");
    Ok(())
}
