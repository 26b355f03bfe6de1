//! `scaf init` — in-process binding for the init helper
//!
//! Validates the project inputs, enforces an empty working directory, and
//! materializes the chosen project template through the package cache.

use crate::config::Config;
use crate::dispatch::CommandCall;
use crate::output::{resolve_color_choice, StyledOutput};
use crate::prompt;
use anyhow::{anyhow, bail, Context};
use scaf_pm::{HttpRegistry, Package, Registry, TemplateInfo, TemplateSource};
use std::fs;
use std::io;
use std::path::Path;

/// Version used when the caller does not pick one.
const DEFAULT_PROJECT_VERSION: &str = "1.0.0";

/// Entry point bound into the dispatch command table.
pub fn run(call: &CommandCall, config: &Config) -> anyhow::Result<i32> {
    let registry = HttpRegistry::with_url(&config.registry_url)?;
    let mut out = StyledOutput::new(resolve_color_choice(), config.debug);
    let workdir = std::env::current_dir()?;

    run_in(call, config, &workdir, &registry, &registry, &mut out)
}

/// Command body with the working directory and registry seams injected.
fn run_in(
    call: &CommandCall,
    config: &Config,
    workdir: &Path,
    registry: &dyn Registry,
    templates: &dyn TemplateSource,
    out: &mut StyledOutput,
) -> anyhow::Result<i32> {
    let project_name = call
        .args
        .first()
        .ok_or_else(|| anyhow!("Project name is required"))?;
    if !prompt::valid_project_name(project_name) {
        bail!(
            "Invalid project name '{}': {}",
            project_name,
            prompt::PROJECT_NAME_MESSAGE
        );
    }

    let project_version = call
        .options
        .project_version
        .as_deref()
        .unwrap_or(DEFAULT_PROJECT_VERSION);
    if !prompt::valid_project_version(project_version) {
        bail!(
            "Invalid project version '{}': {}",
            project_version,
            prompt::PROJECT_VERSION_MESSAGE
        );
    }

    ensure_workable_dir(workdir, call.options.force, out)?;

    let template = choose_template(templates, call.options.template.as_deref())?;
    out.verbose(&format!(
        "template {} -> {}@{}",
        template.name, template.package, template.version
    ));

    let mut pkg = Package::in_store(&template.package, &template.version, config.templates_dir())?;
    if pkg.exists(registry)? {
        out.info(&format!("Updating template {}...", template.name));
        pkg.update(registry)?;
        out.success("Template up to date");
    } else {
        out.info(&format!("Downloading template {}...", template.name));
        pkg.install(registry)?;
        out.success("Template downloaded");
    }

    out.success(&format!(
        "Initialized {} {} from template {}",
        project_name, project_version, template.name
    ));
    Ok(0)
}

/// Refuse a non-empty directory unless `force`, which clears it
///
/// Dot-prefixed entries do not count toward emptiness and are left alone
/// when clearing.
fn ensure_workable_dir(dir: &Path, force: bool, out: &mut StyledOutput) -> anyhow::Result<()> {
    if is_dir_empty(dir)? {
        return Ok(());
    }

    if !force {
        bail!(
            "Directory {} is not empty; re-run with --force to clear it",
            dir.display()
        );
    }

    out.warning(&format!("Clearing {}", dir.display()));
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

/// Whether `dir` has no visible entries
fn is_dir_empty(dir: &Path) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Pick a template by name, or the first published one
fn choose_template(
    source: &dyn TemplateSource,
    wanted: Option<&str>,
) -> anyhow::Result<TemplateInfo> {
    let templates = source
        .project_templates()
        .context("Failed to fetch project templates")?;

    if templates.is_empty() {
        bail!("No project templates are published on the registry");
    }

    match wanted {
        Some(name) => templates
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| {
                let available: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
                anyhow!("Unknown template '{}'. Available: {}", name, available.join(", "))
            }),
        None => Ok(templates[0].clone()),
    }
}
