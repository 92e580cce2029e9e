//! Project management for cfbuild
//!
//! This module handles:
//! - Project detection from the working directory or `--project`
//! - Project creation (`init`)
//! - Loading and rendering the project state (manifest plus answers)
//! - Project locking for concurrent access
//!
//! ## Project Structure
//!
//! ```text
//! <project>/
//! ├── cfbuild.json          # Manifest
//! ├── inputs/<module>.json  # Stored answers, one file per module
//! ├── .gitignore            # Ignores the lock file and build output
//! ├── .cfbuild.lock         # Advisory lock file
//! └── out/masterfiles/      # Build output
//! ```

pub mod lock;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Manifest, input_path};
use crate::domain::module::validate_destination;
use crate::error::{CfError, Result};
use crate::input::AnswerDocument;

pub use lock::{LOCK_FILE, ProjectGuard};

/// Manifest file name
pub const MANIFEST_FILE: &str = "cfbuild.json";

/// Build output directory, relative to the project root
pub const OUTPUT_DIR: &str = "out/masterfiles";

/// Contents of the `.gitignore` written by `init`
pub const GITIGNORE: &str = "/.cfbuild.lock\n/out/\n";

/// A project on disk
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
}

impl Project {
    /// Whether `root` holds a manifest
    pub fn exists(root: &Path) -> bool {
        root.join(MANIFEST_FILE).is_file()
    }

    /// Locate the project
    ///
    /// An explicit path must be a project root. Otherwise the current
    /// directory and its parents are searched for a manifest.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let start = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let start = dunce::canonicalize(&start).map_err(|_| CfError::ProjectNotFound {
            path: start.display().to_string(),
        })?;

        if explicit.is_some() {
            return if Self::exists(&start) {
                Ok(Self { root: start })
            } else {
                Err(CfError::ProjectNotFound {
                    path: start.display().to_string(),
                })
            };
        }

        start
            .ancestors()
            .find(|dir| Self::exists(dir))
            .map(|root| Self {
                root: root.to_path_buf(),
            })
            .ok_or_else(|| CfError::ProjectNotFound {
                path: start.display().to_string(),
            })
    }

    /// Root for a new project: the explicit path or the current directory
    pub fn new_root(explicit: Option<&Path>) -> Result<PathBuf> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };
        fs::create_dir_all(&root).map_err(|e| CfError::FileWriteFailed {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(dunce::canonicalize(&root)?)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// Wait for the project lock (read-only commands)
    pub fn lock(&self) -> Result<ProjectGuard> {
        ProjectGuard::acquire(&self.root)
    }

    /// Read the current state; the caller holds the lock
    pub fn load_state(&self) -> Result<ProjectState> {
        ProjectState::load(&self.root)
    }
}

/// Everything a transaction may change: the manifest and stored answers
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    pub manifest: Manifest,
    /// Answer documents by module name
    pub inputs: BTreeMap<String, AnswerDocument>,
}

impl ProjectState {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            inputs: BTreeMap::new(),
        }
    }

    /// Load the manifest and every answer document it references
    ///
    /// Any unreadable or malformed file is reported as `CorruptState`.
    pub fn load(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        let text = fs::read_to_string(&manifest_path).map_err(|e| corrupt(&manifest_path, e))?;
        let manifest = Manifest::from_json(&text).map_err(|e| corrupt(&manifest_path, e))?;

        for key in manifest.unknown_keys() {
            tracing::warn!("Unknown key '{}' in {}", key, MANIFEST_FILE);
        }

        let mut inputs = BTreeMap::new();
        for entry in &manifest.build {
            let Some(relative) = &entry.input else {
                continue;
            };
            validate_destination(relative).map_err(|reason| corrupt(&manifest_path, reason))?;

            let path = root.join(relative);
            let text = fs::read_to_string(&path).map_err(|e| corrupt(&path, e))?;
            let document = AnswerDocument::parse(&text).map_err(|e| corrupt(&path, e))?;
            inputs.insert(entry.name.clone(), document);
        }

        Ok(Self { manifest, inputs })
    }

    /// Store answers for a module and point its manifest entry at them
    pub fn set_input(&mut self, module: &str, document: AnswerDocument) -> Result<()> {
        let entry = self
            .manifest
            .find_mut(module)
            .ok_or_else(|| CfError::ModuleNotAdded {
                name: module.to_string(),
            })?;
        if entry.input.is_none() {
            entry.input = Some(input_path(module));
        }
        self.inputs.insert(module.to_string(), document);
        Ok(())
    }

    /// Drop a module's stored answers
    pub fn remove_input(&mut self, module: &str) -> Option<AnswerDocument> {
        if let Some(entry) = self.manifest.find_mut(module) {
            entry.input = None;
        }
        self.inputs.remove(module)
    }

    pub fn input(&self, module: &str) -> Option<&AnswerDocument> {
        self.inputs.get(module)
    }

    /// Render the state to file contents keyed by project-relative path
    pub fn render(&self) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
        let mut files = BTreeMap::new();
        files.insert(
            PathBuf::from(MANIFEST_FILE),
            self.manifest.to_json()?.into_bytes(),
        );

        for (module, document) in &self.inputs {
            let relative = self
                .manifest
                .find(module)
                .and_then(|e| e.input.clone())
                .unwrap_or_else(|| input_path(module));
            files.insert(
                PathBuf::from(relative),
                document.to_canonical_string()?.into_bytes(),
            );
        }

        Ok(files)
    }
}

fn corrupt(path: &Path, reason: impl ToString) -> CfError {
    CfError::CorruptState {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManifestEntry;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_project(root: &Path) {
        let mut manifest = Manifest::new("example");
        manifest.upsert(ManifestEntry::new("autorun", "1.0.0"));
        fs::write(root.join(MANIFEST_FILE), manifest.to_json().unwrap()).unwrap();
    }

    #[test]
    fn test_discover_explicit_root() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path());
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let project = Project::discover(Some(temp.path())).unwrap();
        assert_eq!(project.root, dunce::canonicalize(temp.path()).unwrap());

        // An explicit path must be the root itself
        assert!(matches!(
            Project::discover(Some(&nested)),
            Err(CfError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn test_load_and_render_round_trip() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path());

        let mut state = ProjectState::load(temp.path()).unwrap();
        state
            .set_input(
                "autorun",
                AnswerDocument::from_value(json!([{"variable": "x", "value": "y"}])),
            )
            .unwrap();

        let files = state.render().unwrap();
        assert_eq!(files.len(), 2);
        let input = &files[&PathBuf::from("inputs/autorun.json")];
        fs::create_dir_all(temp.path().join("inputs")).unwrap();
        fs::write(temp.path().join("inputs/autorun.json"), input).unwrap();
        fs::write(
            temp.path().join(MANIFEST_FILE),
            &files[&PathBuf::from(MANIFEST_FILE)],
        )
        .unwrap();

        let reloaded = ProjectState::load(temp.path()).unwrap();
        assert_eq!(reloaded, state);
        assert_eq!(reloaded.render().unwrap(), files);
    }

    #[test]
    fn test_set_input_requires_module() {
        let mut state = ProjectState::new(Manifest::new("p"));
        let result = state.set_input("missing", AnswerDocument::from_value(json!([])));
        assert!(matches!(result, Err(CfError::ModuleNotAdded { .. })));
    }

    #[test]
    fn test_missing_input_file_is_corrupt_state() {
        let temp = TempDir::new().unwrap();
        let mut manifest = Manifest::new("p");
        let mut entry = ManifestEntry::new("autorun", "1.0.0");
        entry.input = Some("inputs/autorun.json".to_string());
        manifest.upsert(entry);
        fs::write(temp.path().join(MANIFEST_FILE), manifest.to_json().unwrap()).unwrap();

        assert!(matches!(
            ProjectState::load(temp.path()),
            Err(CfError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_malformed_manifest_is_corrupt_state() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(matches!(
            ProjectState::load(temp.path()),
            Err(CfError::CorruptState { .. })
        ));
    }
}
