//! Info operation
//!
//! Looks a module up in the project's index and renders its questions.

use crate::domain::{ModuleDescriptor, ModuleRef};
use crate::error::Result;
use crate::input::{Prompt, render};
use crate::operations::project_index;
use crate::project::Project;

/// A module's descriptor with its rendered questions
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    pub descriptor: ModuleDescriptor,
    /// Every version the index lists
    pub versions: Vec<String>,
    /// Version in the project, if the module was added
    pub added_version: Option<String>,
    pub prompts: Vec<Prompt>,
}

/// Describe `module` as the project's index lists it
pub fn module_info(project: &Project, module: &ModuleRef) -> Result<ModuleInfo> {
    let _guard = project.lock()?;
    let state = project.load_state()?;
    let index = project_index(&project.root, &state)?;
    let descriptor = index.require(module)?.clone();

    let versions = index
        .versions(&descriptor.name)
        .iter()
        .map(|d| d.version.clone())
        .collect();
    let added_version = state
        .manifest
        .find(&descriptor.name)
        .map(|e| e.version.clone());
    let prompts = descriptor.input.as_deref().map(render).unwrap_or_default();

    Ok(ModuleInfo {
        descriptor,
        versions,
        added_version,
        prompts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CfError;
    use crate::input::PromptKind;
    use crate::operations::test_support::create_project;

    #[test]
    fn test_info_renders_questions() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();

        let info = module_info(&project, &"rm".parse().unwrap()).unwrap();

        assert_eq!(info.descriptor.name, "delete-files");
        assert_eq!(info.versions, vec!["0.0.1", "0.0.2"]);
        assert_eq!(info.added_version, None);
        assert_eq!(info.prompts.len(), 1);
        let PromptKind::Repeat { fields, .. } = &info.prompts[0].kind else {
            panic!("expected a list question");
        };
        assert_eq!(fields[1].path, "files.why");
    }

    #[test]
    fn test_info_unknown_version() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();

        assert!(matches!(
            module_info(&project, &ModuleRef::pinned("autorun", "9.9.9")),
            Err(CfError::ModuleNotFound { .. })
        ));
    }
}
