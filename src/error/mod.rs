//! Error types and handling for cfbuild
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostic codes
//! and help texts. Every fallible operation returns [`Result`], and errors
//! travel unchanged up to the CLI boundary in `main`.
//!
//! The variants group into:
//! - resolution errors (module lookup, cycles, version conflicts)
//! - input errors (answer document validation)
//! - transaction errors (lock contention, corrupt state, history writes)
//! - build errors (unresolved template variables)
//! - project, configuration and file system errors

use miette::Diagnostic;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Main error type for cfbuild operations
#[derive(Error, Diagnostic, Debug)]
pub enum CfError {
    // Resolution errors
    #[error("Module '{name}' not found in index")]
    #[diagnostic(
        code(cfbuild::resolve::not_found),
        help("Check the module name and version, and that the project's index lists it")
    )]
    ModuleNotFound { name: String },

    #[error("Cyclic dependency detected: {}", path.join(" -> "))]
    #[diagnostic(
        code(cfbuild::resolve::cyclic_dependency),
        help("Remove one of the dependencies in the cycle from the index")
    )]
    CyclicDependency { path: Vec<String> },

    #[error("Version conflict for module '{name}': {first} vs {second}")]
    #[diagnostic(
        code(cfbuild::resolve::version_conflict),
        help("Versions are pinned; remove the module or pick versions that agree")
    )]
    VersionConflict {
        name: String,
        first: String,
        second: String,
    },

    // Input errors
    #[error("Invalid input for '{field}': {reason}")]
    #[diagnostic(code(cfbuild::input::validation))]
    Validation { field: String, reason: String },

    #[error("Module '{name}' does not accept input")]
    #[diagnostic(code(cfbuild::input::no_schema))]
    NoInputSchema { name: String },

    // Transaction errors
    #[error("Project at '{path}' is busy")]
    #[diagnostic(
        code(cfbuild::transaction::busy),
        help("Another cfbuild command is modifying this project; retry when it finishes")
    )]
    Busy { path: String },

    #[error("Project state is corrupt: {path}: {reason}")]
    #[diagnostic(code(cfbuild::transaction::corrupt_state))]
    CorruptState { path: String, reason: String },

    #[error("Failed to record change in history: {reason}")]
    #[diagnostic(code(cfbuild::transaction::history_write))]
    HistoryWrite { reason: String },

    // Build errors
    #[error("Unresolved variable '{variable}' in module '{module}'")]
    #[diagnostic(
        code(cfbuild::build::unresolved_variable),
        help("Declare the variable in the module's input, or run 'cfbuild set-input'")
    )]
    UnresolvedVariable { module: String, variable: String },

    // Manifest errors
    #[error("Module '{name}' is not part of this project")]
    #[diagnostic(code(cfbuild::manifest::not_added))]
    ModuleNotAdded { name: String },

    #[error("Module '{name}' is required by: {}", dependents.join(", "))]
    #[diagnostic(
        code(cfbuild::manifest::in_use),
        help("Remove the dependent modules first")
    )]
    ModuleInUse {
        name: String,
        dependents: Vec<String>,
    },

    // Project errors
    #[error("No cfbuild project found at: {path}")]
    #[diagnostic(
        code(cfbuild::project::not_found),
        help("Run 'cfbuild init' to create a project")
    )]
    ProjectNotFound { path: String },

    #[error("A cfbuild project already exists at: {path}")]
    #[diagnostic(code(cfbuild::project::exists))]
    ProjectExists { path: String },

    // Configuration errors
    #[error("Failed to load module index '{path}': {reason}")]
    #[diagnostic(code(cfbuild::config::index_load_failed))]
    IndexLoadFailed { path: String, reason: String },

    #[error("Remote index '{url}' is not supported")]
    #[diagnostic(
        code(cfbuild::config::remote_index),
        help("Clone the index locally and point the project at it with a ./ path")
    )]
    RemoteIndexUnsupported { url: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(cfbuild::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(cfbuild::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(cfbuild::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(cfbuild::fs::io_error))]
    IoError { message: String },
}

impl CfError {
    /// Shorthand for an input validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CfError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for CfError {
    fn from(err: std::io::Error) -> Self {
        CfError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CfError {
    fn from(err: serde_json::Error) -> Self {
        CfError::ConfigInvalid {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CfError {
    fn from(err: serde_yaml::Error) -> Self {
        CfError::ConfigInvalid {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for CfError {
    fn from(err: git2::Error) -> Self {
        CfError::HistoryWrite {
            reason: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, CfError>;
