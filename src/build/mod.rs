//! Build merger
//!
//! Lays the files of every module over each other in build order. A file
//! placed by a later module replaces one placed earlier at the same path;
//! every such replacement is recorded so the user can see it.
//!
//! The merge itself is pure. [`writer`] puts the result on disk.

pub mod template;
pub mod writer;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::ModuleIndex;
use crate::domain::{FileEntry, FileSource, ModuleDescriptor};
use crate::error::{CfError, Result};
use crate::input::{Answers, deserialize};
use crate::project::ProjectState;
use crate::resolver::BuildOrder;

/// One file of the output tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Relative path, `/`-separated
    pub path: String,
    pub content: Vec<u8>,
    /// Module that placed the file
    pub module: String,
}

/// A file placed by one module and then replaced by another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub path: String,
    pub overridden: String,
    pub by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTree {
    /// Files in order of first placement
    files: Vec<OutputFile>,
    positions: HashMap<String, usize>,
    overrides: Vec<Override>,
}

impl OutputTree {
    pub fn files(&self) -> &[OutputFile] {
        &self.files
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn get(&self, path: &str) -> Option<&OutputFile> {
        self.positions.get(path).map(|i| &self.files[*i])
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Place a file; the last writer wins
    fn place(&mut self, file: OutputFile) {
        match self.positions.get(&file.path) {
            Some(&i) => {
                let previous = &self.files[i];
                if previous.module != file.module {
                    tracing::warn!(
                        "'{}' from module '{}' overrides the file from '{}'",
                        file.path,
                        file.module,
                        previous.module
                    );
                    self.overrides.push(Override {
                        path: file.path.clone(),
                        overridden: previous.module.clone(),
                        by: file.module.clone(),
                    });
                }
                self.files[i] = file;
            }
            None => {
                self.positions.insert(file.path.clone(), self.files.len());
                self.files.push(file);
            }
        }
    }
}

/// Merge all modules of `order` into one output tree
///
/// # Errors
///
/// - `Validation` for a module with questions but no stored answers, or
///   answers that no longer match its schema
/// - `UnresolvedVariable` for a template placeholder without an answer
/// - `ModuleNotFound` if the index lacks a module of the build
pub fn build(order: &BuildOrder, state: &ProjectState, index: &ModuleIndex) -> Result<OutputTree> {
    let mut tree = OutputTree::default();

    for module in order.iter() {
        let descriptor = index.require(&module.module_ref())?;
        let answers = module_answers(descriptor, state)?;

        for entry in &descriptor.files {
            for (path, content) in collect_entry(entry)? {
                let content = if entry.template {
                    render_template(&descriptor.name, &path, content, &answers)?
                } else {
                    content
                };
                tree.place(OutputFile {
                    path,
                    content,
                    module: descriptor.name.clone(),
                });
            }
        }

        tracing::debug!("Merged {}@{}", module.name, module.version);
    }

    Ok(tree)
}

fn module_answers(descriptor: &ModuleDescriptor, state: &ProjectState) -> Result<Answers> {
    let Some(schema) = descriptor.input.as_ref().filter(|s| !s.is_empty()) else {
        return Ok(Answers::default());
    };

    let document = state.input(&descriptor.name).ok_or_else(|| {
        CfError::validation(
            descriptor.name.as_str(),
            format!(
                "input has not been set; run 'cfbuild set-input {} <file>'",
                descriptor.name
            ),
        )
    })?;

    deserialize(document, schema).map_err(|e| match e {
        CfError::Validation { field, reason } => {
            CfError::validation(format!("{}: {field}", descriptor.name), reason)
        }
        other => other,
    })
}

fn render_template(module: &str, path: &str, content: Vec<u8>, answers: &Answers) -> Result<Vec<u8>> {
    let text = String::from_utf8(content).map_err(|_| CfError::ConfigInvalid {
        message: format!("template '{path}' of module '{module}' is not UTF-8 text"),
    })?;
    Ok(template::expand(module, &text, answers)?.into_bytes())
}

/// Expand a file entry to `(destination, content)` pairs
///
/// A directory source contributes every file below it, in path order.
fn collect_entry(entry: &FileEntry) -> Result<Vec<(String, Vec<u8>)>> {
    match &entry.source {
        FileSource::Inline(content) => {
            Ok(vec![(entry.destination.clone(), content.as_bytes().to_vec())])
        }
        FileSource::Path(source) if source.is_dir() => collect_dir(source, &entry.destination),
        FileSource::Path(source) if entry.destination.is_empty() => Err(CfError::ConfigInvalid {
            message: format!("file '{}' needs a destination file name", source.display()),
        }),
        FileSource::Path(source) => Ok(vec![(entry.destination.clone(), read(source)?)]),
    }
}

fn collect_dir(dir: &Path, destination: &str) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for item in WalkDir::new(dir).sort_by_file_name() {
        let item = item.map_err(|e| CfError::FileReadFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        if !item.file_type().is_file() {
            continue;
        }

        let relative = item.path().strip_prefix(dir).unwrap_or(item.path());
        let relative: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let relative = relative.join("/");
        let path = if destination.is_empty() {
            relative
        } else {
            format!("{}/{}", destination.trim_end_matches('/'), relative)
        };
        files.push((path, read(item.path())?));
    }
    Ok(files)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| CfError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
