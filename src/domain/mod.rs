//! Domain models for cfbuild
//!
//! This module contains pure domain objects representing core business entities.
//! Descriptors are immutable once loaded from an index.

pub mod module;

pub use module::{FileEntry, FileSource, ModuleDescriptor, ModuleMetadata, ModuleRef};
