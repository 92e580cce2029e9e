//! List command implementation
//!
//! This command lists the project's modules in build order with their
//! versions and whether their input is set.

use std::path::PathBuf;

use crate::cli::ListArgs;
use crate::commands::find_project;
use crate::error::Result;
use crate::operations::list_modules;
use crate::ui::display::display_module;

/// Run list command
pub fn run(project: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let project = find_project(project)?;
    let modules = list_modules(&project)?;

    if modules.is_empty() {
        println!("No modules added.");
        return Ok(());
    }

    println!("Modules in build order ({}):", modules.len());
    for module in &modules {
        display_module(module, args.detailed);
    }
    Ok(())
}
