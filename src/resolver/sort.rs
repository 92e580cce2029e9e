//! Build ordering for module graphs
//!
//! Two passes over the adjacency list (module name → dependency names):
//!
//! 1. Cycle detection with DFS and three-color marking:
//!    - **WHITE** (unvisited): node hasn't been processed
//!    - **GRAY** (on the current path): reaching one again closes a cycle
//!    - **BLACK** (done): node and everything below it is acyclic
//!
//!    The current path is kept so the exact cycle can be reported.
//!
//! 2. Kahn's algorithm, always emitting the lexicographically smallest
//!    ready module, so the order does not depend on insertion order.
//!
//! ```text
//! Dependencies:
//!   web      depends on autorun, base
//!   autorun  depends on base
//!   base     has no dependencies
//!
//! Result: [base, autorun, web]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{CfError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Gray,
    Black,
}

struct CycleSearch<'a> {
    deps: &'a BTreeMap<String, Vec<String>>,
    marks: HashMap<&'a str, Mark>,
    path: Vec<&'a str>,
}

impl<'a> CycleSearch<'a> {
    fn visit(&mut self, name: &'a str) -> Option<Vec<String>> {
        match self.marks.get(name) {
            Some(Mark::Black) => return None,
            Some(Mark::Gray) => {
                let start = self.path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    self.path[start..].iter().map(|n| (*n).to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            None => {}
        }

        self.marks.insert(name, Mark::Gray);
        self.path.push(name);

        let graph = self.deps;
        if let Some(deps) = graph.get(name) {
            for dep in deps {
                if let Some(cycle) = self.visit(dep) {
                    return Some(cycle);
                }
            }
        }

        self.path.pop();
        self.marks.insert(name, Mark::Black);
        None
    }
}

/// Find a dependency cycle, returned with its first module repeated at the end
///
/// Nodes are visited in name order, so the same graph always reports the
/// same cycle.
pub fn find_cycle(deps: &BTreeMap<String, Vec<String>>) -> Option<Vec<String>> {
    let mut search = CycleSearch {
        deps,
        marks: HashMap::new(),
        path: Vec::new(),
    };

    deps.keys().find_map(|name| search.visit(name))
}

/// Order modules so every module comes after its dependencies
///
/// Dependencies that are not nodes of the graph are ignored here; callers
/// check for missing modules while building the graph.
///
/// # Errors
///
/// Returns `CyclicDependency` with the exact cycle; no partial order is
/// produced.
pub fn topological_sort(deps: &BTreeMap<String, Vec<String>>) -> Result<Vec<String>> {
    if let Some(path) = find_cycle(deps) {
        return Err(CfError::CyclicDependency { path });
    }

    // Number of unemitted dependencies per module, and the reverse edges
    let mut waiting: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for (name, module_deps) in deps {
        let known: BTreeSet<&str> = module_deps
            .iter()
            .map(String::as_str)
            .filter(|d| deps.contains_key(*d))
            .collect();
        waiting.insert(name, known.len());
        for dep in known {
            dependents.entry(dep).or_default().push(name);
        }
    }

    let mut ready: BTreeSet<&str> = waiting
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(deps.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = waiting.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(name, deps)| {
                (
                    (*name).to_string(),
                    deps.iter().map(|d| (*d).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_dependencies_first() {
        let deps = graph(&[
            ("web", &["autorun", "base"]),
            ("autorun", &["base"]),
            ("base", &[]),
        ]);
        assert_eq!(topological_sort(&deps).unwrap(), vec!["base", "autorun", "web"]);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let deps = graph(&[("zeta", &[]), ("alpha", &[]), ("mid", &["zeta"])]);
        assert_eq!(topological_sort(&deps).unwrap(), vec!["alpha", "zeta", "mid"]);
    }

    #[test]
    fn test_order_independent_of_insertion() {
        let a = graph(&[("b", &["c"]), ("a", &["c"]), ("c", &[])]);
        let b = graph(&[("c", &[]), ("a", &["c"]), ("b", &["c"])]);
        assert_eq!(topological_sort(&a).unwrap(), topological_sort(&b).unwrap());
    }

    #[test]
    fn test_cycle_path_is_exact() {
        let deps = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"]), ("d", &[])]);
        let Err(CfError::CyclicDependency { path }) = topological_sort(&deps) else {
            panic!("expected cycle");
        };
        assert_eq!(path, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_cycle_not_including_first_node() {
        let deps = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["b"])]);
        assert_eq!(find_cycle(&deps).unwrap(), vec!["b", "c", "b"]);
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let deps = graph(&[("a", &["a"])]);
        assert_eq!(find_cycle(&deps).unwrap(), vec!["a", "a"]);
    }

    #[test]
    fn test_unknown_dependencies_ignored() {
        let deps = graph(&[("a", &["external"])]);
        assert_eq!(topological_sort(&deps).unwrap(), vec!["a"]);
    }
}
