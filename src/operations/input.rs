//! Input operations
//!
//! `set-input` validates an answer document against the module's schema
//! and stores its canonical form; `get-input` prints the stored document,
//! or a skeleton to fill in when there is none yet.

use crate::config::ModuleIndex;
use crate::error::{CfError, Result};
use crate::input::{AnswerDocument, QuestionSpec, deserialize, serialize, skeleton};
use crate::operations::{project_index, transaction_log};
use crate::project::{Project, ProjectState};
use crate::transaction::CommitOutcome;

/// Validate `text` and store it as the module's answers
///
/// `text` is read by the caller before this is called, so a pipe from
/// `get-input` on the same project never waits for the lock.
///
/// # Errors
///
/// `Validation` if the document does not answer the schema; nothing is
/// written in that case.
pub fn set_input(project: &Project, module: &str, text: &str) -> Result<CommitOutcome> {
    let document = AnswerDocument::parse(text)?;
    let log = transaction_log(&project.root)?;

    log.commit(|state| {
        let index = project_index(&project.root, state)?;
        let schema = module_schema(state, &index, module)?;

        let answers = deserialize(&document, schema)?;
        state.set_input(module, serialize(&answers))?;
        Ok(format!("Set input for module '{module}'"))
    })
}

/// Canonical text of the module's answers, or of a skeleton document
pub fn get_input(project: &Project, module: &str) -> Result<String> {
    let _guard = project.lock()?;
    let state = project.load_state()?;
    let index = project_index(&project.root, &state)?;
    let schema = module_schema(&state, &index, module)?;

    match state.input(module) {
        Some(document) => document.to_canonical_string(),
        None => skeleton(schema).to_canonical_string(),
    }
}

/// Schema of a module in the project, at the version the project uses
fn module_schema<'a>(
    state: &ProjectState,
    index: &'a ModuleIndex,
    module: &str,
) -> Result<&'a [QuestionSpec]> {
    let entry = state
        .manifest
        .find(module)
        .ok_or_else(|| CfError::ModuleNotAdded {
            name: module.to_string(),
        })?;
    let descriptor = index.require(&entry.module_ref())?;

    match &descriptor.input {
        Some(schema) if !schema.is_empty() => Ok(schema.as_slice()),
        _ => Err(CfError::NoInputSchema {
            name: module.to_string(),
        }),
    }
}
