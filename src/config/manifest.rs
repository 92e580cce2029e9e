//! Project manifest (cfbuild.json)
//!
//! The manifest lists the modules that make up the project, in the order
//! they were added, with exact versions and the dependencies they were
//! resolved with. Keys cfbuild does not know are kept as they are so a
//! hand-edited manifest survives a round trip.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::index::RawIndex;
use crate::domain::ModuleRef;
use crate::error::{CfError, Result};

/// `added_by` value of modules the user asked for explicitly
pub const ADDED_BY_USER: &str = "user";

/// Project manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,

    #[serde(rename = "type", default)]
    pub project_type: ProjectType,

    #[serde(default)]
    pub description: String,

    /// Where modules come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexSource>,

    /// Modules in insertion order
    #[serde(default)]
    pub build: Vec<ManifestEntry>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    #[default]
    PolicySet,
    Index,
    Module,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectType::PolicySet => "policy-set",
            ProjectType::Index => "index",
            ProjectType::Module => "module",
        })
    }
}

/// The manifest's `index` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexSource {
    /// Relative path (`./index.json`) or URL
    Path(String),
    Inline(Box<RawIndex>),
}

/// One module in the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,

    pub version: String,

    /// `user`, or the name of the module this one was pulled in by
    #[serde(default = "default_added_by")]
    pub added_by: String,

    /// Dependencies as resolved when the entry was added
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ModuleRef>,

    /// Path of the stored answer document, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

fn default_added_by() -> String {
    ADDED_BY_USER.to_string()
}

impl ManifestEntry {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            added_by: default_added_by(),
            dependencies: Vec::new(),
            input: None,
        }
    }

    #[must_use]
    pub fn added_by(mut self, added_by: impl Into<String>) -> Self {
        self.added_by = added_by.into();
        self
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<ModuleRef>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn is_user_added(&self) -> bool {
        self.added_by == ADDED_BY_USER
    }

    pub fn module_ref(&self) -> ModuleRef {
        ModuleRef::pinned(&self.name, &self.version)
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }
}

/// Relative path of a module's answer document
pub fn input_path(module: &str) -> String {
    format!("inputs/{module}.json")
}

impl Manifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_type: ProjectType::PolicySet,
            description: String::new(),
            index: None,
            build: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Parse manifest JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json).map_err(|e| CfError::ConfigInvalid {
            message: format!("cfbuild.json: {e}"),
        })?;
        manifest.check_unique_names()?;
        Ok(manifest)
    }

    /// Canonical text: pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    fn check_unique_names(&self) -> Result<()> {
        for (i, entry) in self.build.iter().enumerate() {
            if self.build[..i].iter().any(|e| e.name == entry.name) {
                return Err(CfError::ConfigInvalid {
                    message: format!("cfbuild.json: module '{}' is listed twice", entry.name),
                });
            }
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ManifestEntry> {
        self.build.iter().find(|e| e.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ManifestEntry> {
        self.build.iter_mut().find(|e| e.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.build.iter().position(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Insert an entry, or replace the entry of the same name in place
    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.position(&entry.name) {
            Some(i) => self.build[i] = entry,
            None => self.build.push(entry),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<ManifestEntry> {
        let i = self.position(name)?;
        Some(self.build.remove(i))
    }

    /// Names of the modules that depend on `name`, in manifest order
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        self.build
            .iter()
            .filter(|e| e.depends_on(name))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Top-level keys cfbuild does not interpret
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }
}
