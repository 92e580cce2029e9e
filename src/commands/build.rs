//! Build command implementation

use std::path::PathBuf;

use crate::cli::BuildArgs;
use crate::commands::find_project;
use crate::error::Result;
use crate::operations::build_project;
use crate::ui::display::display_build_summary;
use crate::ui::{InteractiveProgressReporter, ProgressReporter, SilentProgressReporter};

/// Run build command
pub fn run(project: Option<PathBuf>, args: BuildArgs) -> Result<()> {
    let project = find_project(project)?;

    let mut progress: Box<dyn ProgressReporter> = if args.quiet {
        Box::new(SilentProgressReporter)
    } else {
        Box::new(InteractiveProgressReporter::default())
    };
    let summary = build_project(&project, progress.as_mut())?;

    display_build_summary(&summary);
    Ok(())
}
