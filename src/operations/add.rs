//! Add operation
//!
//! Resolves each requested module against the index and records it,
//! together with every dependency the project does not have yet, in one
//! commit. Requesting another version of a module already in the project
//! replaces its entry in place.

use crate::config::ManifestEntry;
use crate::domain::ModuleRef;
use crate::error::Result;
use crate::operations::{describe_modules, project_index, transaction_log};
use crate::project::{Project, ProjectState};
use crate::resolver::{BuildOrder, resolve, resolve_manifest};
use crate::transaction::CommitOutcome;

/// Add `requested` modules to the project
///
/// # Errors
///
/// Resolution errors (`ModuleNotFound`, `VersionConflict`,
/// `CyclicDependency`) leave the project untouched, as do lock and
/// history failures.
pub fn add_modules(project: &Project, requested: &[ModuleRef]) -> Result<CommitOutcome> {
    let log = transaction_log(&project.root)?;

    log.commit(|state| {
        let index = project_index(&project.root, state)?;
        let mut added = Vec::new();

        for module in requested {
            let name = index.require(module)?.name.clone();
            let order = resolve(module, &index, &state.manifest)?;
            if record(state, &order, &name) {
                added.push(name);
            }
        }

        // The whole project must still order cleanly after replacements
        resolve_manifest(&state.manifest)?;

        Ok(format!("Added {}", describe_modules(&added)))
    })
}

/// Record a resolved closure; returns whether the requested entry changed
fn record(state: &mut ProjectState, order: &BuildOrder, requested: &str) -> bool {
    let mut changed = false;

    for module in order.iter() {
        if module.name == requested {
            let previous = state.manifest.find(requested);
            let mut entry = ManifestEntry::new(&module.name, &module.version)
                .with_dependencies(module.dependencies.clone());
            entry.input = previous.and_then(|e| e.input.clone());

            changed = previous != Some(&entry);
            if let Some(previous) = previous.filter(|p| p.version != module.version) {
                tracing::info!(
                    "Replacing {}@{} with {}@{}",
                    previous.name,
                    previous.version,
                    module.name,
                    module.version
                );
            }
            state.manifest.upsert(entry);
            continue;
        }

        if state.manifest.contains(&module.name) {
            continue;
        }

        let dependent = order
            .iter()
            .find(|m| m.dependencies.iter().any(|d| d.name == module.name))
            .map_or(requested, |m| m.name.as_str());
        tracing::info!(
            "Adding dependency {}@{} (required by '{}')",
            module.name,
            module.version,
            dependent
        );
        state.manifest.upsert(
            ManifestEntry::new(&module.name, &module.version)
                .added_by(dependent)
                .with_dependencies(module.dependencies.clone()),
        );
    }

    changed
}
