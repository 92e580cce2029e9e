//! Configuration file handling for cfbuild
//!
//! This module contains data structures for:
//! - `cfbuild.json` - Project manifest
//! - module indexes (JSON, YAML, or inline in the manifest)
//! - structural validation of both

pub mod index;
pub mod manifest;
pub mod validate;

// Re-export commonly used types
pub use index::{ModuleIndex, RawIndex, load_for_project};
pub use manifest::{ADDED_BY_USER, IndexSource, Manifest, ManifestEntry, ProjectType, input_path};
pub use validate::{ValidateMode, validate_document, validate_file};
