//! Init operation
//!
//! Creates `cfbuild.json`, adds its ignore rules to `.gitignore`, creates a
//! git repository when the
//! directory is not inside one, and the project's first commit.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{IndexSource, Manifest};
use crate::error::{CfError, Result};
use crate::history::{CommitId, GitHistory, History};
use crate::project::{GITIGNORE, MANIFEST_FILE, Project, ProjectGuard};
use crate::transaction::write_atomic;

const GITIGNORE_FILE: &str = ".gitignore";

/// Configuration options for init
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Project name; defaults to the directory name
    pub name: Option<String>,
    pub description: Option<String>,
    /// Path (relative to the project) or URL of the module index
    pub index: Option<String>,
}

/// Create a new project at `root`
pub fn init_project(root: &Path, options: &InitOptions) -> Result<CommitId> {
    if Project::exists(root) {
        return Err(CfError::ProjectExists {
            path: root.display().to_string(),
        });
    }

    let _guard = ProjectGuard::acquire_or_busy(root)?;
    let history = GitHistory::open_or_init(root)?;

    let mut manifest = Manifest::new(
        options
            .name
            .clone()
            .unwrap_or_else(|| default_name(root)),
    );
    manifest.description = options.description.clone().unwrap_or_default();
    manifest.index = options.index.as_deref().map(index_reference);

    let mut paths = vec![PathBuf::from(MANIFEST_FILE)];
    let gitignore = root.join(GITIGNORE_FILE);
    let previous_gitignore = read_existing(&gitignore)?;
    let merged = merge_gitignore(previous_gitignore.as_deref().unwrap_or_default());
    let wrote_gitignore = previous_gitignore.as_deref() != Some(merged.as_str());
    if wrote_gitignore {
        write_atomic(&gitignore, merged.as_bytes())?;
        paths.push(PathBuf::from(GITIGNORE_FILE));
    }

    let manifest_path = root.join(MANIFEST_FILE);
    write_atomic(&manifest_path, manifest.to_json()?.as_bytes())?;

    match history.commit(&paths, "Initialized a new project") {
        Ok(id) => {
            tracing::info!("Initialized project '{}' in {}", manifest.name, root.display());
            Ok(id)
        }
        Err(e) => {
            // Leave the directory as it was so init can be retried
            let _ = fs::remove_file(&manifest_path);
            if wrote_gitignore {
                let _ = match &previous_gitignore {
                    Some(previous) => fs::write(&gitignore, previous),
                    None => fs::remove_file(&gitignore),
                };
            }
            Err(e)
        }
    }
}

fn default_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CfError::FileReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Append the project's ignore rules that `existing` lacks
fn merge_gitignore(existing: &str) -> String {
    let missing: Vec<&str> = GITIGNORE
        .lines()
        .filter(|rule| !existing.lines().any(|line| line.trim() == *rule))
        .collect();
    if missing.is_empty() {
        return existing.to_string();
    }

    let mut merged = existing.to_string();
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    for rule in missing {
        merged.push_str(rule);
        merged.push('\n');
    }
    merged
}

/// Index references are URLs or `./`-relative paths
fn index_reference(index: &str) -> IndexSource {
    if index.contains("://") || index.starts_with("./") || index.starts_with("../") {
        IndexSource::Path(index.to_string())
    } else {
        IndexSource::Path(format!("./{index}"))
    }
}
