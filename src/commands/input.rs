//! set-input and get-input command implementations
//!
//! `-` stands for standard input or output.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::cli::{GetInputArgs, SetInputArgs};
use crate::commands::{find_project, report_outcome};
use crate::error::{CfError, Result};
use crate::operations::{get_input, set_input};

const STDIO: &str = "-";

/// Run set-input command
pub fn run_set(project: Option<PathBuf>, args: SetInputArgs) -> Result<()> {
    let project = find_project(project)?;
    // Read everything before the lock is taken
    let text = read_document(&args.file)?;

    let outcome = set_input(&project, &args.module, &text)?;
    report_outcome(&outcome, "Input unchanged.");
    Ok(())
}

/// Run get-input command
pub fn run_get(project: Option<PathBuf>, args: GetInputArgs) -> Result<()> {
    let project = find_project(project)?;
    let text = get_input(&project, &args.module)?;

    if args.file == STDIO {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(&args.file, text).map_err(|e| CfError::FileWriteFailed {
            path: args.file.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn read_document(file: &str) -> Result<String> {
    if file == STDIO {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    fs::read_to_string(file).map_err(|e| CfError::FileReadFailed {
        path: file.to_string(),
        reason: e.to_string(),
    })
}
