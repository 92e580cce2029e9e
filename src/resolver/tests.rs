use super::*;
use crate::config::ManifestEntry;
use crate::domain::ModuleDescriptor;
use crate::error::CfError;

fn module(name: &str, version: &str, deps: &[&str]) -> ModuleDescriptor {
    deps.iter().fold(ModuleDescriptor::new(name, version), |m, d| {
        m.with_dependency(d.parse().unwrap())
    })
}

fn index() -> ModuleIndex {
    ModuleIndex::from_descriptors([
        module("base", "1.0.0", &[]),
        module("autorun", "1.0.0", &["base@1.0.0"]),
        module("delete-files", "0.0.1", &["autorun@1.0.0"]),
        module("web", "2.1.0", &["delete-files@0.0.1", "base@1.0.0", "alpha@1.0.0"]),
        module("alpha", "1.0.0", &[]),
        module("cycle-a", "1.0.0", &["cycle-b@1.0.0"]),
        module("cycle-b", "1.0.0", &["cycle-c@1.0.0"]),
        module("cycle-c", "1.0.0", &["cycle-a@1.0.0"]),
    ])
    .with_alias("deletefiles", "delete-files")
}

#[test]
fn test_resolve_returns_closure_once_each_dependencies_first() {
    let order = resolve(&ModuleRef::new("web", None), &index(), &Manifest::new("p")).unwrap();

    assert_eq!(
        order.names(),
        vec!["alpha", "base", "autorun", "delete-files", "web"]
    );
    for (i, module) in order.iter().enumerate() {
        for dep in &module.dependencies {
            let pos = order.names().iter().position(|n| *n == dep.name).unwrap();
            assert!(pos < i, "{} must come before {}", dep.name, module.name);
        }
    }
}

#[test]
fn test_resolve_leaf_module() {
    let order = resolve(&ModuleRef::pinned("base", "1.0.0"), &index(), &Manifest::new("p")).unwrap();
    assert_eq!(order.names(), vec!["base"]);
    assert_eq!(order.get("base").unwrap().version, "1.0.0");
}

#[test]
fn test_resolve_through_alias() {
    let order =
        resolve(&ModuleRef::new("deletefiles", None), &index(), &Manifest::new("p")).unwrap();
    assert_eq!(order.names(), vec!["base", "autorun", "delete-files"]);
}

#[test]
fn test_resolve_cycle() {
    let result = resolve(&ModuleRef::new("cycle-b", None), &index(), &Manifest::new("p"));
    let Err(CfError::CyclicDependency { path }) = result else {
        panic!("expected cycle");
    };
    assert_eq!(path, vec!["cycle-a", "cycle-b", "cycle-c", "cycle-a"]);
}

#[test]
fn test_resolve_not_found() {
    let result = resolve(&ModuleRef::new("nope", None), &index(), &Manifest::new("p"));
    assert!(matches!(result, Err(CfError::ModuleNotFound { .. })));

    let result = resolve(&ModuleRef::pinned("base", "9.0.0"), &index(), &Manifest::new("p"));
    assert!(matches!(result, Err(CfError::ModuleNotFound { .. })));
}

#[test]
fn test_replacing_requested_module_is_not_conflict() {
    let mut existing = Manifest::new("p");
    existing.upsert(ManifestEntry::new("autorun", "0.9.0"));

    let order = resolve(&ModuleRef::new("autorun", None), &index(), &existing).unwrap();
    assert_eq!(order.get("autorun").unwrap().version, "1.0.0");
}

#[test]
fn test_dependency_conflicts_with_manifest() {
    let mut existing = Manifest::new("p");
    existing.upsert(ManifestEntry::new("base", "0.5.0"));

    let result = resolve(&ModuleRef::new("autorun", None), &index(), &existing);
    assert!(matches!(
        result,
        Err(CfError::VersionConflict { ref name, .. }) if name == "base"
    ));
}

#[test]
fn test_resolve_is_pure() {
    let mut existing = Manifest::new("p");
    existing.upsert(ManifestEntry::new("base", "1.0.0"));
    let before = existing.clone();

    let first = resolve(&ModuleRef::new("web", None), &index(), &existing).unwrap();
    let second = resolve(&ModuleRef::new("web", None), &index(), &existing).unwrap();
    assert_eq!(first, second);
    assert_eq!(existing, before);
}

#[test]
fn test_resolve_manifest_orders_project() {
    let mut manifest = Manifest::new("p");
    manifest.upsert(
        ManifestEntry::new("delete-files", "0.0.1")
            .with_dependencies(vec![ModuleRef::pinned("autorun", "1.0.0")]),
    );
    manifest.upsert(ManifestEntry::new("zz-standalone", "1.0.0"));
    manifest.upsert(
        ManifestEntry::new("autorun", "1.0.0")
            .added_by("delete-files")
            .with_dependencies(vec![ModuleRef::pinned("base", "1.0.0")]),
    );
    manifest.upsert(ManifestEntry::new("base", "1.0.0").added_by("autorun"));

    let order = resolve_manifest(&manifest).unwrap();
    assert_eq!(
        order.names(),
        vec!["base", "autorun", "delete-files", "zz-standalone"]
    );
}

#[test]
fn test_resolve_manifest_detects_cycle() {
    let mut manifest = Manifest::new("p");
    manifest.upsert(
        ManifestEntry::new("a", "1.0.0").with_dependencies(vec![ModuleRef::pinned("b", "1.0.0")]),
    );
    manifest.upsert(
        ManifestEntry::new("b", "1.0.0").with_dependencies(vec![ModuleRef::pinned("a", "1.0.0")]),
    );

    assert!(matches!(
        resolve_manifest(&manifest),
        Err(CfError::CyclicDependency { .. })
    ));
}

#[test]
fn test_empty_manifest() {
    assert!(resolve_manifest(&Manifest::new("p")).unwrap().is_empty());
}
