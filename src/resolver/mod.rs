//! Dependency resolution for cfbuild modules
//!
//! This module handles:
//! - Expanding a requested module into its transitive closure
//! - Version conflict detection against the closure and the manifest
//! - Circular dependency detection
//! - Deterministic build ordering (dependencies first, ties by name)
//!
//! Resolution is pure: it reads the index and manifest and never writes.

pub mod graph;
pub mod sort;

use crate::config::{Manifest, ModuleIndex};
use crate::domain::ModuleRef;
use crate::error::Result;

pub use graph::ResolvedModule;

/// Modules in the order they must be built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOrder {
    modules: Vec<ResolvedModule>,
}

impl BuildOrder {
    #[cfg(test)]
    pub fn modules(&self) -> &[ResolvedModule] {
        &self.modules
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&ResolvedModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn order_graph(mut graph: graph::DependencyGraph) -> Result<BuildOrder> {
    let order = sort::topological_sort(&graph::adjacency(&graph))?;
    let modules = order
        .iter()
        .filter_map(|name| graph.remove(name))
        .collect();
    Ok(BuildOrder { modules })
}

/// Resolve `requested` and everything it needs against `index`
///
/// Returns the closure of `requested` (including itself), each module
/// once, dependencies before dependents.
///
/// # Errors
///
/// `ModuleNotFound`, `VersionConflict` or `CyclicDependency`.
pub fn resolve(requested: &ModuleRef, index: &ModuleIndex, existing: &Manifest) -> Result<BuildOrder> {
    tracing::debug!("Resolving {}", requested);
    order_graph(graph::collect_closure(requested, index, existing)?)
}

/// Order every module of a project from the manifest alone
pub fn resolve_manifest(manifest: &Manifest) -> Result<BuildOrder> {
    order_graph(graph::manifest_graph(manifest)?)
}

#[cfg(test)]
mod tests;
