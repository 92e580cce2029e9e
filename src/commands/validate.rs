//! Validate command implementation

use std::path::PathBuf;

use console::Style;

use crate::cli::ValidateArgs;
use crate::commands::find_project;
use crate::config::{ValidateMode, validate_file};
use crate::error::Result;

/// Run validate command
pub fn run(project: Option<PathBuf>, args: ValidateArgs) -> Result<()> {
    let file = match args.file {
        Some(file) => file,
        None => find_project(project)?.manifest_path(),
    };
    let mode = if args.build {
        ValidateMode::Build
    } else {
        ValidateMode::Config
    };

    validate_file(&file, mode)?;
    println!(
        "{} {}",
        Style::new().green().bold().apply_to("Valid:"),
        file.display()
    );
    Ok(())
}
