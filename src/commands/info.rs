//! Info command implementation

use std::path::PathBuf;

use crate::cli::InfoArgs;
use crate::commands::find_project;
use crate::error::Result;
use crate::operations::module_info;
use crate::ui::display::display_module_info;

/// Run info command
pub fn run(project: Option<PathBuf>, args: InfoArgs) -> Result<()> {
    let project = find_project(project)?;
    let info = module_info(&project, &args.module)?;
    display_module_info(&info);
    Ok(())
}
