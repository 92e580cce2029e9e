//! Module index loading
//!
//! The index is an external, read-only catalog. It can be a local JSON or
//! YAML file, or an object inlined in the manifest's `index` field:
//!
//! ```json
//! {
//!   "name": "local-index",
//!   "type": "index",
//!   "description": "Modules for our hosts",
//!   "index": {
//!     "autorun": { "version": "1.0.0", "description": "...", "files": [...] },
//!     "delete-files": [ { "version": "0.0.1", ... }, { "version": "0.0.2", ... } ],
//!     "autorun-legacy": { "alias": "autorun" }
//!   }
//! }
//! ```
//!
//! Everything is normalized into [`ModuleDescriptor`]s up front; the rest
//! of the crate never sees the raw format.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::manifest::IndexSource;
use crate::domain::module::{normalize_destination, validate_source};
use crate::domain::{FileEntry, FileSource, ModuleDescriptor, ModuleMetadata, ModuleRef};
use crate::error::{CfError, Result};
use crate::input::{RawQuestion, parse_schema};

/// Index document as written on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub index: BTreeMap<String, RawIndexEntry>,
}

/// One name in the index: an alias, a single version, or several versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawIndexEntry {
    Alias(RawAlias),
    Versions(Vec<RawModule>),
    Module(Box<RawModule>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAlias {
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawModule {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    /// Module directory relative to the index; defaults to the module name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdirectory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<RawFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    pub destination: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub template: bool,
}

/// Normalized module catalog
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    /// Versions per name, in the order the index lists them
    modules: BTreeMap<String, Vec<ModuleDescriptor>>,
    aliases: BTreeMap<String, String>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Build an index directly from descriptors
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        let mut index = Self::new();
        for descriptor in descriptors {
            index.insert(descriptor);
        }
        index
    }

    pub fn insert(&mut self, descriptor: ModuleDescriptor) {
        self.modules
            .entry(descriptor.name.clone())
            .or_default()
            .push(descriptor);
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    /// Load an index file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CfError::IndexLoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let raw = parse_raw_index(path, &content)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_raw(&raw, base_dir)
    }

    /// Normalize a raw index; relative paths resolve against `base_dir`
    pub fn from_raw(raw: &RawIndex, base_dir: &Path) -> Result<Self> {
        let mut index = Self::new();

        for (name, entry) in &raw.index {
            match entry {
                RawIndexEntry::Alias(alias) => {
                    index.aliases.insert(name.clone(), alias.alias.clone());
                }
                RawIndexEntry::Module(module) => {
                    index.insert(descriptor_from_raw(name, module, base_dir)?);
                }
                RawIndexEntry::Versions(versions) => {
                    for module in versions {
                        index.insert(descriptor_from_raw(name, module, base_dir)?);
                    }
                }
            }
        }

        for (alias, target) in &index.aliases {
            if !index.modules.contains_key(target) {
                return Err(CfError::ConfigInvalid {
                    message: format!("alias '{alias}' points to unknown module '{target}'"),
                });
            }
        }

        Ok(index)
    }

    /// Follow an alias to the real module name
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Look up a module; without a version, the last listed version is used
    pub fn get(&self, module: &ModuleRef) -> Option<&ModuleDescriptor> {
        let versions = self.modules.get(self.canonical_name(&module.name))?;
        match &module.version {
            Some(version) => versions.iter().find(|d| &d.version == version),
            None => versions.last(),
        }
    }

    /// Like [`get`](Self::get) but with a `ModuleNotFound` error
    pub fn require(&self, module: &ModuleRef) -> Result<&ModuleDescriptor> {
        self.get(module).ok_or_else(|| CfError::ModuleNotFound {
            name: module.to_string(),
        })
    }

    pub fn versions(&self, name: &str) -> &[ModuleDescriptor] {
        self.modules
            .get(self.canonical_name(name))
            .map_or(&[], Vec::as_slice)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Load the index a project points at
///
/// Paths are relative to the project root. Remote indexes are recognized
/// but not fetched.
pub fn load_for_project(root: &Path, source: Option<&IndexSource>) -> Result<ModuleIndex> {
    match source {
        Some(IndexSource::Path(path)) if is_remote(path) => {
            Err(CfError::RemoteIndexUnsupported { url: path.clone() })
        }
        Some(IndexSource::Path(path)) => {
            tracing::debug!("Loading module index from {}", path);
            ModuleIndex::load(&root.join(path))
        }
        Some(IndexSource::Inline(raw)) => ModuleIndex::from_raw(raw, root),
        None => Err(CfError::ConfigInvalid {
            message: "cfbuild.json has no \"index\"; point it at a module index".to_string(),
        }),
    }
}

fn is_remote(path: &str) -> bool {
    path.starts_with("https://") || path.starts_with("http://")
}

/// Parse index text as YAML for `.yaml`/`.yml` files, JSON otherwise
pub fn parse_raw_index(path: &Path, content: &str) -> Result<RawIndex> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| CfError::IndexLoadFailed {
        path: path.display().to_string(),
        reason,
    })
}

fn descriptor_from_raw(name: &str, raw: &RawModule, base_dir: &Path) -> Result<ModuleDescriptor> {
    let module_dir: PathBuf = base_dir.join(raw.subdirectory.as_deref().unwrap_or(name));

    let dependencies = raw
        .dependencies
        .iter()
        .map(|d| d.parse::<ModuleRef>())
        .collect::<Result<Vec<_>>>()?;

    let files = raw
        .files
        .iter()
        .map(|file| file_from_raw(name, file, &module_dir))
        .collect::<Result<Vec<_>>>()?;

    let input = raw
        .input
        .as_ref()
        .map(|questions| parse_schema(name, questions))
        .transpose()?;

    Ok(ModuleDescriptor {
        name: name.to_string(),
        version: raw.version.clone(),
        description: raw.description.clone().unwrap_or_default(),
        tags: raw.tags.clone(),
        metadata: ModuleMetadata {
            by: raw.by.clone(),
            repo: raw.repo.clone(),
            commit: raw.commit.clone(),
            website: raw.website.clone(),
            documentation: raw.documentation.clone(),
        },
        dependencies,
        files,
        input,
    })
}

fn file_from_raw(module: &str, raw: &RawFile, module_dir: &Path) -> Result<FileEntry> {
    let invalid = |reason: String| CfError::ConfigInvalid {
        message: format!("module '{module}': {reason}"),
    };
    let destination = normalize_destination(&raw.destination).map_err(invalid)?;

    let source = match (&raw.source, &raw.content) {
        (Some(source), None) => {
            validate_source(source).map_err(invalid)?;
            FileSource::Path(module_dir.join(source))
        }
        (None, Some(_)) if destination.is_empty() => {
            return Err(invalid(format!(
                "destination '{}' must name a file",
                raw.destination
            )));
        }
        (None, Some(content)) => FileSource::Inline(content.clone()),
        _ => {
            return Err(invalid(format!(
                "file '{}' needs exactly one of \"source\" or \"content\"",
                raw.destination
            )));
        }
    };

    Ok(FileEntry {
        source,
        destination,
        template: raw.template,
    })
}
