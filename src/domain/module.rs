//! Module domain types
//!
//! A module is a named, versioned unit of configuration content with
//! optional dependencies and an optional input schema.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CfError, Result};
use crate::input::QuestionSpec;

/// Reference to a module by name, optionally pinned to an exact version
///
/// Textual form is `name` or `name@version`, which is also how it is
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleRef {
    pub name: String,
    pub version: Option<String>,
}

impl ModuleRef {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Reference pinned to an exact version
    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, Some(version.into()))
    }
}

impl FromStr for ModuleRef {
    type Err = CfError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = match s.split_once('@') {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (s.trim(), None),
        };

        if name.is_empty() {
            return Err(CfError::ConfigInvalid {
                message: format!("Module reference '{s}' has an empty name"),
            });
        }
        if version.is_some_and(str::is_empty) {
            return Err(CfError::ConfigInvalid {
                message: format!("Module reference '{s}' has an empty version"),
            });
        }

        Ok(Self::new(name, version.map(str::to_string)))
    }
}

impl TryFrom<String> for ModuleRef {
    type Error = CfError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModuleRef> for String {
    fn from(module: ModuleRef) -> Self {
        module.to_string()
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

/// Where the bytes of a file entry come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// A file or directory on disk (absolute after index loading)
    Path(PathBuf),
    /// Content given directly in the index
    Inline(String),
}

/// One file (or directory) a module contributes to the build output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub source: FileSource,
    /// Relative destination in the output tree
    pub destination: String,
    /// Expand `{{ variable }}` placeholders from the module's answers
    pub template: bool,
}

impl FileEntry {
    #[cfg(test)]
    pub fn inline(destination: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: FileSource::Inline(content.into()),
            destination: destination.into(),
            template: false,
        }
    }

    #[cfg(test)]
    pub fn path(destination: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            source: FileSource::Path(source.into()),
            destination: destination.into(),
            template: false,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn templated(mut self) -> Self {
        self.template = true;
        self
    }
}

/// Check that a destination stays inside the output tree
pub fn validate_destination(destination: &str) -> std::result::Result<(), String> {
    check_relative("destination", destination, "must not leave the output tree")
}

/// Check that a file source stays inside the module directory
pub fn validate_source(source: &str) -> std::result::Result<(), String> {
    check_relative("source", source, "must not leave the module directory")
}

fn check_relative(kind: &str, value: &str, escape: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    let path = Path::new(value);
    if path.is_absolute() || value.starts_with('/') || value.starts_with('\\') {
        return Err(format!("{kind} '{value}' must be a relative path"));
    }
    if value.split(['/', '\\']).any(|segment| segment == "..")
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
    {
        return Err(format!("{kind} '{value}' {escape}"));
    }
    Ok(())
}

/// Validate a destination and bring it to `/`-separated form
///
/// `.` and empty segments are dropped, so `./def.json`, `def.json` and
/// `services//x.cf/` name the same paths as their plain spellings. The
/// result is empty only for destinations that name the output root.
pub fn normalize_destination(destination: &str) -> std::result::Result<String, String> {
    validate_destination(destination)?;
    let segments: Vec<&str> = destination
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    Ok(segments.join("/"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub by: Option<String>,
    pub repo: Option<String>,
    pub commit: Option<String>,
    pub website: Option<String>,
    pub documentation: Option<String>,
}

/// Normalized, read-only view of one module version from the index
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Author, source repository and links; shown by `info`
    pub metadata: ModuleMetadata,
    pub dependencies: Vec<ModuleRef>,
    pub files: Vec<FileEntry>,
    pub input: Option<Vec<QuestionSpec>>,
}

impl ModuleDescriptor {
    #[cfg(test)]
    /// Create a descriptor with no dependencies, files or input
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            tags: Vec::new(),
            metadata: ModuleMetadata::default(),
            dependencies: Vec::new(),
            files: Vec::new(),
            input: None,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_dependency(mut self, dependency: ModuleRef) -> Self {
        self.dependencies.push(dependency);
        self
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_file(mut self, file: FileEntry) -> Self {
        self.files.push(file);
        self
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_input(mut self, input: Vec<QuestionSpec>) -> Self {
        self.input = Some(input);
        self
    }

    /// Reference pinned to this descriptor's exact version
    pub fn module_ref(&self) -> ModuleRef {
        ModuleRef::pinned(&self.name, &self.version)
    }

    /// Whether the module declares questions
    pub fn has_input(&self) -> bool {
        self.input.as_ref().is_some_and(|q| !q.is_empty())
    }
}
