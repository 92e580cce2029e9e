//! Build operation
//!
//! Validates the manifest, orders the project's modules, merges their
//! files and writes the result to `out/masterfiles`.

use std::fs;
use std::path::PathBuf;

use crate::build::{Override, build, writer};
use crate::config::{ValidateMode, validate_document};
use crate::error::{CfError, Result};
use crate::history::{CommitId, GitHistory, History};
use crate::operations::project_index;
use crate::project::Project;
use crate::resolver::resolve_manifest;
use crate::ui::ProgressReporter;

/// What a build produced
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub out_dir: PathBuf,
    /// Commit the project was at, if it has history
    pub commit: Option<CommitId>,
    pub modules: usize,
    pub files: usize,
    pub overrides: Vec<Override>,
}

/// Build the project into its output directory
///
/// Holds the project lock (waiting for it if needed) for the whole build.
pub fn build_project(
    project: &Project,
    progress: &mut dyn ProgressReporter,
) -> Result<BuildSummary> {
    let _guard = project.lock()?;

    let manifest_path = project.manifest_path();
    let text = fs::read_to_string(&manifest_path).map_err(|e| CfError::FileReadFailed {
        path: manifest_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| CfError::CorruptState {
            path: manifest_path.display().to_string(),
            reason: e.to_string(),
        })?;
    validate_document(&document, ValidateMode::Build)?;

    let state = project.load_state()?;
    let index = project_index(&project.root, &state)?;
    let order = resolve_manifest(&state.manifest)?;
    tracing::debug!("Build order: {}", order.names().join(", "));

    let tree = build(&order, &state, &index)?;
    let commit = built_from(project);

    let out_dir = project.output_dir();
    writer::write_output(&tree, &out_dir, progress)?;

    Ok(BuildSummary {
        out_dir,
        commit,
        modules: order.len(),
        files: tree.len(),
        overrides: tree.overrides().to_vec(),
    })
}

fn built_from(project: &Project) -> Option<CommitId> {
    let history = match GitHistory::open(&project.root) {
        Ok(history) => history,
        Err(e) => {
            tracing::debug!("No history for build: {}", e);
            return None;
        }
    };
    if matches!(history.has_working_changes(), Ok(true)) {
        tracing::warn!("Project has uncommitted changes; the output may not match any commit");
    }
    history.current_head().ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndexSource, RawIndex};
    use crate::domain::ModuleRef;
    use crate::operations::test_support::{INDEX, create_project};
    use crate::operations::{add_modules, set_input, transaction_log};
    use crate::ui::SilentProgressReporter;

    #[test]
    fn test_build_writes_merged_tree() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();
        add_modules(&project, &[ModuleRef::new("delete-files", None)]).unwrap();
        set_input(
            &project,
            "delete-files",
            r#"[{"variable": "files", "response": [{"path": "/tmp/a"}]}]"#,
        )
        .unwrap();

        let summary = build_project(&project, &mut SilentProgressReporter).unwrap();

        assert_eq!(summary.modules, 3);
        assert_eq!(summary.files, 3);
        assert_eq!(
            summary.commit,
            GitHistory::open(&root).unwrap().current_head().unwrap()
        );
        assert_eq!(
            summary.overrides,
            vec![Override {
                path: "def.json".to_string(),
                overridden: "masterfiles".to_string(),
                by: "autorun".to_string(),
            }]
        );

        let out = project.output_dir();
        assert!(
            fs::read_to_string(out.join("def.json"))
                .unwrap()
                .contains("services_autorun")
        );
        assert_eq!(
            fs::read_to_string(out.join("services/autorun/delete_files.cf")).unwrap(),
            "files => [{\"path\":\"/tmp/a\",\"why\":\"Unknown\"}]\n"
        );

        // Output is ignored by git
        assert!(!GitHistory::open(&root).unwrap().has_working_changes().unwrap());
    }

    #[test]
    fn test_build_requires_input() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();
        add_modules(&project, &[ModuleRef::new("delete-files", None)]).unwrap();

        let Err(CfError::Validation { field, .. }) = build_project(&project, &mut SilentProgressReporter) else {
            panic!("expected a validation error");
        };
        assert_eq!(field, "delete-files");
    }

    #[test]
    fn test_build_with_index_inlined_in_manifest() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();
        let raw: RawIndex = serde_json::from_str(INDEX).unwrap();
        transaction_log(&root)
            .unwrap()
            .commit(|state| {
                state.manifest.index = Some(IndexSource::Inline(Box::new(raw)));
                Ok("Inline the module index".to_string())
            })
            .unwrap();
        add_modules(&project, &[ModuleRef::new("autorun", None)]).unwrap();

        let summary = build_project(&project, &mut SilentProgressReporter).unwrap();

        assert_eq!(summary.modules, 2);
        assert!(
            fs::read_to_string(project.output_dir().join("def.json"))
                .unwrap()
                .contains("services_autorun")
        );
    }

    #[test]
    fn test_build_empty_project_fails_validation() {
        let (_temp, root) = create_project();
        let project = Project::discover(Some(&root)).unwrap();

        assert!(matches!(
            build_project(&project, &mut SilentProgressReporter),
            Err(CfError::Validation { .. })
        ));
    }
}
