//! Init command implementation

use std::path::PathBuf;

use console::Style;

use crate::cli::InitArgs;
use crate::error::Result;
use crate::operations::{InitOptions, init_project};
use crate::project::Project;

impl From<InitArgs> for InitOptions {
    fn from(args: InitArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            index: args.index,
        }
    }
}

/// Run init command
pub fn run(project: Option<PathBuf>, args: InitArgs) -> Result<()> {
    let root = Project::new_root(project.as_deref())?;
    let id = init_project(&root, &args.into())?;

    println!(
        "{} project in {} ({})",
        Style::new().green().bold().apply_to("Initialized"),
        root.display(),
        id.short()
    );
    Ok(())
}
