//! Dependency graph construction for modules
//!
//! The graph is a map from module name to the pinned references the
//! module depends on:
//!
//! ```text
//! BTreeMap<String, ResolvedModule>
//!    ↓              ↓
//!  module name   { version, dependencies: [name@version, ...] }
//! ```
//!
//! It is rebuilt on every request, either from the index (when adding) or
//! from the dependencies cached in the manifest (when building).

use std::collections::BTreeMap;

use crate::config::{Manifest, ModuleIndex};
use crate::domain::ModuleRef;
use crate::error::{CfError, Result};

/// A module with its dependencies pinned to exact versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<ModuleRef>,
}

impl ResolvedModule {
    pub fn module_ref(&self) -> ModuleRef {
        ModuleRef::pinned(&self.name, &self.version)
    }

    /// Names of the dependencies, for sorting
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| d.name.clone()).collect()
    }
}

pub type DependencyGraph = BTreeMap<String, ResolvedModule>;

/// Collect the transitive closure of `requested`
///
/// Dependencies already in `existing` at the version required are taken
/// from the manifest's cached dependency lists without consulting the
/// index. A dependency without a version uses the version already chosen
/// in the closure, then the manifest's, then the last one the index lists.
///
/// # Errors
///
/// - `ModuleNotFound` if the index lacks a module or version
/// - `VersionConflict` if one name is required at two versions, either
///   within the closure or against `existing`. The requested module
///   itself may differ from its manifest entry (that is a replacement).
pub fn collect_closure(
    requested: &ModuleRef,
    index: &ModuleIndex,
    existing: &Manifest,
) -> Result<DependencyGraph> {
    let root = index.require(requested)?;
    let root_name = root.name.clone();

    let mut graph = DependencyGraph::new();
    // Modules still to expand, with whether their dependencies come from the index
    let mut pending: Vec<(ResolvedModule, bool)> = vec![(
        ResolvedModule {
            name: root.name.clone(),
            version: root.version.clone(),
            dependencies: Vec::new(),
        },
        true,
    )];

    while let Some((mut module, from_index)) = pending.pop() {
        let dependencies = if from_index {
            index.require(&module.module_ref())?.dependencies.clone()
        } else {
            existing
                .find(&module.name)
                .map(|e| e.dependencies.clone())
                .unwrap_or_default()
        };

        for dependency in &dependencies {
            let name = index.canonical_name(&dependency.name).to_string();
            let chosen = chosen_version(&name, &graph, &pending).map(str::to_string);
            let existing_version = existing
                .find(&name)
                .filter(|_| name != root_name)
                .map(|e| e.version.clone());

            let version = match (&dependency.version, &chosen, &existing_version) {
                (Some(version), _, _) => version.clone(),
                (None, Some(version), _) | (None, None, Some(version)) => version.clone(),
                (None, None, None) => index.require(&ModuleRef::new(name.as_str(), None))?.version.clone(),
            };

            for first in [&chosen, &existing_version].into_iter().flatten() {
                if *first != version {
                    return Err(CfError::VersionConflict {
                        name,
                        first: first.clone(),
                        second: version,
                    });
                }
            }

            module
                .dependencies
                .push(ModuleRef::pinned(name.clone(), version.clone()));

            if chosen.is_some() || name == module.name {
                continue;
            }

            let reuse = existing_version.is_some();
            if !reuse {
                index.require(&ModuleRef::pinned(name.clone(), version.clone()))?;
            }

            pending.push((
                ResolvedModule {
                    name,
                    version,
                    dependencies: Vec::new(),
                },
                !reuse,
            ));
        }

        tracing::debug!(
            "Resolved {}@{} ({} dependencies)",
            module.name,
            module.version,
            module.dependencies.len()
        );
        graph.insert(module.name.clone(), module);
    }

    Ok(graph)
}

/// Version already picked for `name` in this resolution, if any
fn chosen_version<'a>(
    name: &str,
    graph: &'a DependencyGraph,
    pending: &'a [(ResolvedModule, bool)],
) -> Option<&'a str> {
    graph
        .get(name)
        .or_else(|| pending.iter().map(|(m, _)| m).find(|m| m.name == name))
        .map(|m| m.version.as_str())
}

/// Build the graph of a whole project from the manifest's cached dependencies
///
/// # Errors
///
/// `ModuleNotFound` for a dependency missing from the manifest and
/// `VersionConflict` for one cached at a different version than its entry.
pub fn manifest_graph(manifest: &Manifest) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new();

    for entry in &manifest.build {
        for dependency in &entry.dependencies {
            let Some(target) = manifest.find(&dependency.name) else {
                return Err(CfError::ModuleNotFound {
                    name: format!("{dependency} (required by '{}')", entry.name),
                });
            };
            if let Some(version) = &dependency.version {
                if version != &target.version {
                    return Err(CfError::VersionConflict {
                        name: target.name.clone(),
                        first: target.version.clone(),
                        second: version.clone(),
                    });
                }
            }
        }

        graph.insert(
            entry.name.clone(),
            ResolvedModule {
                name: entry.name.clone(),
                version: entry.version.clone(),
                dependencies: entry.dependencies.clone(),
            },
        );
    }

    Ok(graph)
}

/// Adjacency list of a graph, for sorting
pub fn adjacency(graph: &DependencyGraph) -> BTreeMap<String, Vec<String>> {
    graph
        .iter()
        .map(|(name, module)| (name.clone(), module.dependency_names()))
        .collect()
}
