//! Remove operation
//!
//! Removes modules and their stored input, then prunes dependencies that
//! were pulled in automatically and are no longer needed by anything.

use crate::error::{CfError, Result};
use crate::operations::{describe_modules, quoted_list, transaction_log};
use crate::project::{Project, ProjectState};
use crate::transaction::CommitOutcome;

/// Remove `names` from the project in one commit
///
/// # Errors
///
/// - `ModuleNotAdded` for a name the project does not contain
/// - `ModuleInUse` if a module that stays depends on one being removed
pub fn remove_modules(project: &Project, names: &[String]) -> Result<CommitOutcome> {
    let log = transaction_log(&project.root)?;

    log.commit(|state| {
        for name in names {
            if !state.manifest.contains(name) {
                return Err(CfError::ModuleNotAdded { name: name.clone() });
            }

            let dependents: Vec<String> = state
                .manifest
                .dependents_of(name)
                .into_iter()
                .filter(|d| !names.contains(d))
                .collect();
            if !dependents.is_empty() {
                return Err(CfError::ModuleInUse {
                    name: name.clone(),
                    dependents,
                });
            }
        }

        for name in names {
            remove_entry(state, name);
        }

        let pruned = prune_unused(state);
        let mut message = format!("Removed {}", describe_modules(names));
        if !pruned.is_empty() {
            message.push_str(&format!(" and unused dependencies {}", quoted_list(&pruned)));
        }
        Ok(message)
    })
}

fn remove_entry(state: &mut ProjectState, name: &str) {
    state.remove_input(name);
    state.manifest.remove(name);
}

/// Remove automatically added modules nothing depends on any more
///
/// Repeats until stable, since removing one may orphan its own dependencies.
fn prune_unused(state: &mut ProjectState) -> Vec<String> {
    let mut pruned = Vec::new();

    loop {
        let unused: Vec<String> = state
            .manifest
            .build
            .iter()
            .filter(|e| !e.is_user_added() && state.manifest.dependents_of(&e.name).is_empty())
            .map(|e| e.name.clone())
            .collect();
        if unused.is_empty() {
            return pruned;
        }

        for name in unused {
            tracing::info!("Removing unused dependency '{}'", name);
            remove_entry(state, &name);
            pruned.push(name);
        }
    }
}
