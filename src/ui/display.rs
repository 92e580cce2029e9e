//! Display functions for modules and build results
//!
//! This module provides the styled terminal output of `list`, `info` and
//! `build`.

use console::Style;

use crate::build::Override;
use crate::operations::{BuildSummary, ListedModule, ModuleInfo};

macro_rules! display_field {
    ($label:expr, $value:expr) => {{
        println!("  {} {}", Style::new().bold().apply_to($label), $value);
    }};
}

/// Display one module of `list`
pub fn display_module(module: &ListedModule, detailed: bool) {
    let input = if module.has_input {
        Style::new().green().apply_to("input set")
    } else {
        Style::new().dim().apply_to("no input")
    };
    println!(
        "  {} {} ({})",
        Style::new().bold().yellow().apply_to(&module.name),
        module.version,
        input
    );

    if detailed {
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Added by:"),
            module.added_by
        );
        if module.dependencies.is_empty() {
            println!(
                "    {} {}",
                Style::new().bold().apply_to("Dependencies:"),
                Style::new().dim().apply_to("None")
            );
        } else {
            println!("    {}", Style::new().bold().apply_to("Dependencies:"));
            for dependency in &module.dependencies {
                println!("      - {}", Style::new().cyan().apply_to(dependency));
            }
        }
    }
}

/// Display a module from the index with its questions
pub fn display_module_info(info: &ModuleInfo) {
    let descriptor = &info.descriptor;
    println!(
        "{} {}",
        Style::new().bold().yellow().apply_to(&descriptor.name),
        descriptor.version
    );

    if !descriptor.description.is_empty() {
        display_field!("Description:", &descriptor.description);
    }
    if !descriptor.tags.is_empty() {
        display_field!("Tags:", descriptor.tags.join(", "));
    }
    let metadata = &descriptor.metadata;
    for (label, value) in [
        ("By:", &metadata.by),
        ("Repository:", &metadata.repo),
        ("Commit:", &metadata.commit),
        ("Website:", &metadata.website),
        ("Documentation:", &metadata.documentation),
    ] {
        if let Some(value) = value {
            display_field!(label, value);
        }
    }
    display_field!("Versions:", info.versions.join(", "));
    match &info.added_version {
        Some(version) => display_field!("In project:", version),
        None => display_field!("In project:", Style::new().dim().apply_to("no")),
    }

    if !descriptor.dependencies.is_empty() {
        println!("  {}", Style::new().bold().apply_to("Dependencies:"));
        for dependency in &descriptor.dependencies {
            println!("    - {}", Style::new().cyan().apply_to(dependency));
        }
    }

    let n = descriptor.files.len();
    let files_label = if n == 1 { "file" } else { "files" };
    println!(
        "  {} ({} {})",
        Style::new().bold().apply_to("Files:"),
        n,
        files_label
    );
    for file in &descriptor.files {
        let marker = if file.template { " (template)" } else { "" };
        println!("    {}{}", Style::new().dim().apply_to(&file.destination), marker);
    }

    if !info.prompts.is_empty() {
        println!("  {}", Style::new().bold().apply_to("Input:"));
        for prompt in &info.prompts {
            for line in prompt.to_string().lines() {
                println!("    {line}");
            }
        }
    }
}

/// Display the result of a build, including every override
pub fn display_build_summary(summary: &BuildSummary) {
    for o in &summary.overrides {
        display_override(o);
    }
    let modules_label = if summary.modules == 1 { "module" } else { "modules" };
    let files_label = if summary.files == 1 { "file" } else { "files" };
    let from = summary
        .commit
        .as_ref()
        .map(|id| format!(" from {}", id.short()))
        .unwrap_or_default();
    println!(
        "{} {} {} ({} {}){} into {}",
        Style::new().green().bold().apply_to("Built"),
        summary.modules,
        modules_label,
        summary.files,
        files_label,
        from,
        summary.out_dir.display()
    );
}

fn display_override(o: &Override) {
    println!(
        "{} {} from '{}' overrides '{}'",
        Style::new().yellow().bold().apply_to("Override:"),
        o.path,
        o.by,
        o.overridden
    );
}
