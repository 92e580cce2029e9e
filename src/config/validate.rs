//! Structural validation of manifest and index documents
//!
//! Works on the raw JSON value rather than the typed structs, so problems
//! are reported with the field that caused them instead of a serde error
//! position. The first problem found is returned.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::module::{validate_destination, validate_source};
use crate::error::{CfError, Result};

/// How strict to be about the `build` list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateMode {
    /// Accept a missing or empty `build` list
    Config,
    /// About to build: `build` must list at least one module
    Build,
}

/// Read and validate a manifest or index file (JSON, or YAML by extension)
pub fn validate_file(path: &Path, mode: ValidateMode) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|e| CfError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yaml" || e == "yml");
    let value: Value = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_document(&value, mode)
}

/// Validate a parsed document
pub fn validate_document(document: &Value, mode: ValidateMode) -> Result<()> {
    let Some(config) = document.as_object() else {
        return Err(CfError::validation("document", "must be a JSON object"));
    };

    validate_top_level(config)?;

    match (mode, config.get("build")) {
        (ValidateMode::Build, build) => validate_build(build, true)?,
        (ValidateMode::Config, Some(build)) => validate_build(Some(build), false)?,
        (ValidateMode::Config, None) => {}
    }

    if let Some(modules) = index_modules(config)? {
        for (name, module) in modules {
            validate_index_module(name, module, modules)?;
        }
    }

    Ok(())
}

/// The module map: `index` itself in an index file, `index.index` when a
/// manifest inlines its index
fn index_modules(config: &Map<String, Value>) -> Result<Option<&Map<String, Value>>> {
    let Some(Value::Object(index)) = config.get("index") else {
        return Ok(None);
    };
    if config.get("type").and_then(Value::as_str) == Some("index") {
        return Ok(Some(index));
    }
    match index.get("index") {
        Some(Value::Object(modules)) => Ok(Some(modules)),
        _ => Err(CfError::validation(
            "index",
            "an inline index must have an \"index\" object listing its modules",
        )),
    }
}

fn validate_top_level(config: &Map<String, Value>) -> Result<()> {
    for field in ["name", "type", "description"] {
        if !config.contains_key(field) {
            return Err(CfError::validation(field, "field is required"));
        }
    }

    if !config["name"].as_str().is_some_and(|n| !n.is_empty()) {
        return Err(CfError::validation("name", "must be a non-empty string"));
    }

    let project_type = config["type"].as_str();
    if !matches!(project_type, Some("policy-set" | "index" | "module")) {
        return Err(CfError::validation(
            "type",
            "must be \"policy-set\", \"index\", or \"module\"",
        ));
    }
    if project_type == Some("index") && !config.get("index").is_some_and(Value::is_object) {
        return Err(CfError::validation(
            "index",
            "an index-type file must have an \"index\" object listing its modules",
        ));
    }

    if !config["description"].is_string() {
        return Err(CfError::validation("description", "must be a string"));
    }

    if config.get("git").is_some_and(|g| !g.is_boolean()) {
        return Err(CfError::validation("git", "must be true or false"));
    }

    match config.get("index") {
        None | Some(Value::Object(_)) => Ok(()),
        Some(Value::String(index)) => validate_index_reference(index),
        Some(_) => Err(CfError::validation(
            "index",
            "must be a path or URL (string) or an inline index (object)",
        )),
    }
}

fn validate_index_reference(index: &str) -> Result<()> {
    if index.trim().is_empty() {
        return Err(CfError::validation("index", "must not be blank"));
    }
    if ![".json", ".yaml", ".yml"].iter().any(|ext| index.ends_with(ext)) {
        return Err(CfError::validation(
            "index",
            "must refer to a JSON or YAML file (ending in .json, .yaml or .yml)",
        ));
    }
    if !index.starts_with("https://") && !index.starts_with("./") {
        return Err(CfError::validation(
            "index",
            "must be a URL (starting with https://) or a relative path (starting with ./)",
        ));
    }
    if index.starts_with("https://") && index.contains(' ') {
        return Err(CfError::validation("index", "URL must not contain spaces"));
    }
    Ok(())
}

fn validate_build(build: Option<&Value>, required: bool) -> Result<()> {
    let entries = match build {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(CfError::validation("build", "must be a list of modules"));
        }
        None => {
            return Err(CfError::validation(
                "build",
                "field is missing; add modules with 'cfbuild add'",
            ));
        }
    };

    if required && entries.is_empty() {
        return Err(CfError::validation(
            "build",
            "is empty; add modules with 'cfbuild add'",
        ));
    }

    for (i, entry) in entries.iter().enumerate() {
        let Some(entry) = entry.as_object() else {
            return Err(CfError::validation(
                format!("build[{i}]"),
                "must be an object",
            ));
        };
        let label = entry
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("build[{i}]"), str::to_string);

        if entry.contains_key("alias") {
            return Err(CfError::validation(label, "\"alias\" is not supported in \"build\""));
        }
        for field in ["name", "version"] {
            if !entry.contains_key(field) {
                return Err(CfError::validation(
                    label,
                    format!("\"{field}\" field is required"),
                ));
            }
        }
        non_empty_string(&label, entry, "name")?;
        check_version(&label, &entry["version"])?;
    }

    Ok(())
}

fn validate_index_module(name: &str, module: &Value, modules: &Map<String, Value>) -> Result<()> {
    let Some(module) = module.as_object() else {
        // Several versions of one module
        if let Value::Array(versions) = module {
            for version in versions {
                if version.get("alias").is_some() {
                    return Err(CfError::validation(
                        name,
                        "\"alias\" cannot be listed as a version",
                    ));
                }
                validate_index_module(name, version, modules)?;
            }
            return Ok(());
        }
        return Err(CfError::validation(name, "must be an object"));
    };

    if let Some(alias) = module.get("alias") {
        return validate_alias(name, module, alias, modules);
    }

    if !module.contains_key("description") {
        return Err(CfError::validation(name, "\"description\" field is required"));
    }
    non_empty_string(name, module, "description")?;

    if let Some(tags) = module.get("tags") {
        let ok = tags
            .as_array()
            .is_some_and(|tags| tags.iter().all(Value::is_string));
        if !ok {
            return Err(CfError::validation(name, "\"tags\" must be a list of strings"));
        }
    }

    for field in ["repo", "by", "subdirectory"] {
        if module.contains_key(field) {
            non_empty_string(name, module, field)?;
        }
    }

    if let Some(version) = module.get("version") {
        check_version(name, version)?;
    }

    if let Some(commit) = module.get("commit") {
        if !commit.as_str().is_some_and(is_commit_hash) {
            return Err(CfError::validation(
                name,
                "\"commit\" must be a 40 character commit hash",
            ));
        }
    }

    if let Some(dependencies) = module.get("dependencies") {
        validate_dependencies(name, dependencies, modules)?;
    }

    for field in ["website", "documentation"] {
        if let Some(url) = module.get(field) {
            if !url.as_str().is_some_and(|u| u.starts_with("https://")) {
                return Err(CfError::validation(
                    name,
                    format!("\"{field}\" must be an HTTPS URL"),
                ));
            }
        }
    }

    if let Some(files) = module.get("files") {
        validate_files(name, files)?;
    }

    Ok(())
}

fn validate_alias(
    name: &str,
    module: &Map<String, Value>,
    alias: &Value,
    modules: &Map<String, Value>,
) -> Result<()> {
    if module.len() != 1 {
        return Err(CfError::validation(
            name,
            "\"alias\" cannot be used with other attributes",
        ));
    }
    let Some(target) = alias.as_str() else {
        return Err(CfError::validation(name, "\"alias\" must be a string"));
    };
    if target.is_empty() {
        return Err(CfError::validation(name, "\"alias\" must be non-empty"));
    }
    match modules.get(target) {
        None => Err(CfError::validation(
            name,
            "\"alias\" must reference another module",
        )),
        Some(other) if other.get("alias").is_some() => Err(CfError::validation(
            name,
            "\"alias\" cannot reference another alias",
        )),
        Some(_) => Ok(()),
    }
}

fn validate_dependencies(name: &str, dependencies: &Value, modules: &Map<String, Value>) -> Result<()> {
    let Some(dependencies) = dependencies.as_array() else {
        return Err(CfError::validation(name, "\"dependencies\" must be a list"));
    };

    for dependency in dependencies {
        let Some(dependency) = dependency.as_str() else {
            return Err(CfError::validation(
                name,
                "\"dependencies\" must be a list of strings",
            ));
        };
        let target = dependency.split_once('@').map_or(dependency, |(n, _)| n);
        match modules.get(target) {
            None => {
                return Err(CfError::validation(
                    name,
                    format!("dependency '{dependency}' is not in the index"),
                ));
            }
            Some(other) if other.get("alias").is_some() => {
                return Err(CfError::validation(
                    name,
                    format!("dependency '{dependency}' refers to an alias"),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_files(name: &str, files: &Value) -> Result<()> {
    let Some(files) = files.as_array() else {
        return Err(CfError::validation(name, "\"files\" must be a list"));
    };

    for (i, file) in files.iter().enumerate() {
        let destination = file.get("destination").and_then(Value::as_str);
        let Some(destination) = destination else {
            return Err(CfError::validation(
                name,
                format!("files[{i}] needs a \"destination\" string"),
            ));
        };
        validate_destination(destination)
            .map_err(|reason| CfError::validation(name, format!("files[{i}]: {reason}")))?;

        if let Some(source) = file.get("source") {
            let Some(source) = source.as_str() else {
                return Err(CfError::validation(
                    name,
                    format!("files[{i}]: \"source\" must be a string"),
                ));
            };
            validate_source(source)
                .map_err(|reason| CfError::validation(name, format!("files[{i}]: {reason}")))?;
        }

        let has_source = file.get("source").is_some();
        let has_content = file.get("content").is_some();
        if has_source == has_content {
            return Err(CfError::validation(
                name,
                format!("files[{i}] needs exactly one of \"source\" or \"content\""),
            ));
        }
    }
    Ok(())
}

fn non_empty_string(name: &str, object: &Map<String, Value>, field: &str) -> Result<()> {
    match object.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(CfError::validation(
            name,
            format!("\"{field}\" must be a non-empty string"),
        )),
    }
}

fn check_version(name: &str, version: &Value) -> Result<()> {
    if version.as_str().is_some_and(is_valid_version) {
        Ok(())
    } else {
        Err(CfError::validation(
            name,
            "\"version\" must look like 1.2.3 or 1.2.3-4",
        ))
    }
}

/// `MAJOR.MINOR.PATCH` with an optional numeric `-RELEASE`, no leading zeros
/// in the dotted parts
pub fn is_valid_version(version: &str) -> bool {
    let (core, release) = match version.split_once('-') {
        Some((core, release)) => (core, Some(release)),
        None => (version, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    let core_ok = parts.len() == 3 && parts.iter().all(|p| is_number(p, false));
    core_ok && release.is_none_or(|r| is_number(r, true))
}

fn is_number(part: &str, allow_leading_zero: bool) -> bool {
    !part.is_empty()
        && part.bytes().all(|b| b.is_ascii_digit())
        && (allow_leading_zero || part == "0" || !part.starts_with('0'))
}

fn is_commit_hash(commit: &str) -> bool {
    commit.len() == 40 && commit.bytes().all(|b| b.is_ascii_hexdigit())
}
