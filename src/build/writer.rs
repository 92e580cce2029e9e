//! Writes a merged output tree to disk
//!
//! The output directory is replaced wholesale, so files of modules that
//! were removed from the project do not linger.

use std::fs;
use std::path::Path;

use crate::build::OutputTree;
use crate::error::{CfError, Result};
use crate::ui::ProgressReporter;

/// Replace `out_dir` with the contents of `tree`
pub fn write_output(
    tree: &OutputTree,
    out_dir: &Path,
    progress: &mut dyn ProgressReporter,
) -> Result<()> {
    match fs::remove_dir_all(out_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(write_failed(out_dir, e)),
    }
    fs::create_dir_all(out_dir).map_err(|e| write_failed(out_dir, e))?;

    progress.start(tree.len() as u64);
    for file in tree.files() {
        if let Err(e) = write_file(out_dir, &file.path, &file.content) {
            progress.abandon();
            return Err(e);
        }
        progress.update_file(&file.path);
    }
    progress.finish();

    tracing::debug!("Wrote {} file(s) to {}", tree.len(), out_dir.display());
    Ok(())
}

fn write_file(out_dir: &Path, relative: &str, content: &[u8]) -> Result<()> {
    let target = out_dir.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(parent, e))?;
    }
    fs::write(&target, content).map_err(|e| write_failed(&target, e))
}

fn write_failed(path: &Path, e: std::io::Error) -> CfError {
    CfError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
