//! List operation
//!
//! Lists the project's modules in build order.

use crate::error::Result;
use crate::project::Project;
use crate::resolver::resolve_manifest;

/// One module as shown by `list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedModule {
    pub name: String,
    pub version: String,
    pub added_by: String,
    pub dependencies: Vec<String>,
    pub has_input: bool,
}

/// Modules of the project, dependencies first
pub fn list_modules(project: &Project) -> Result<Vec<ListedModule>> {
    let _guard = project.lock()?;
    let state = project.load_state()?;
    let order = resolve_manifest(&state.manifest)?;

    Ok(order
        .iter()
        .filter_map(|module| state.manifest.find(&module.name))
        .map(|entry| ListedModule {
            name: entry.name.clone(),
            version: entry.version.clone(),
            added_by: entry.added_by.clone(),
            dependencies: entry.dependencies.iter().map(ToString::to_string).collect(),
            has_input: state.input(&entry.name).is_some(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModuleRef;
    use crate::operations::test_support::create_project;
    use crate::operations::{add_modules, set_input};

    #[test]
    fn test_list_in_build_order() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();
        add_modules(&project, &[ModuleRef::new("delete-files", None)]).unwrap();
        set_input(&project, "delete-files", r#"[{"variable": "files", "response": []}]"#).unwrap();

        let modules = list_modules(&project).unwrap();

        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["masterfiles", "autorun", "delete-files"]);
        assert!(modules[2].has_input);
        assert!(!modules[1].has_input);
        assert_eq!(modules[2].dependencies, vec!["autorun@1.0.0".to_string()]);
    }

    #[test]
    fn test_list_empty_project() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();
        assert!(list_modules(&project).unwrap().is_empty());
    }
}
