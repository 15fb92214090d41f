//! File generation pipeline: folders, rule-driven copies, and markers.
//!
//! Rules run strictly in declaration order; that order decides which rule wins
//! the duplicate-target check, and empty-folder marking runs only after every
//! copy so a folder populated by a later rule is never marked.
use crate::config::{Configuration, FileRule, PostProcess};
use crate::error::{Result, SetupError};
use crate::paths::normalize_relative_path;
use crate::placeholders::{self, RenderContext};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Materialize `config` under `project_root`, resolving rule sources against
/// `artifact_root`. Returns the relative path of every file written, copies
/// first, then empty-folder markers.
pub fn generate(
    project_root: &Path,
    artifact_root: &Path,
    config: &Configuration,
    ctx: &RenderContext,
) -> Result<Vec<String>> {
    for folder in &config.folders {
        let path = project_root.join(folder);
        fs::create_dir_all(&path).map_err(|err| SetupError::io("create", &path, err))?;
    }

    let mut generated = Vec::new();
    let mut seen_targets = BTreeSet::new();
    for rule in config.files.iter().filter(|rule| rule.enabled) {
        let target = apply_rule(project_root, artifact_root, rule, ctx, &seen_targets)?;
        seen_targets.insert(target.clone());
        generated.push(target);
    }

    if config.behavior.add_gitkeep_to_empty_folders {
        for folder in &config.folders {
            let folder_path = project_root.join(folder);
            if dir_is_empty(&folder_path)? {
                let marker = folder_path.join(".gitkeep");
                fs::write(&marker, b"").map_err(|err| SetupError::io("write", &marker, err))?;
                generated.push(format!("{folder}/.gitkeep"));
            }
        }
    }

    tracing::info!(
        config = %config.id,
        files = generated.len(),
        folders = config.folders.len(),
        "generation complete"
    );
    Ok(generated)
}

fn apply_rule(
    project_root: &Path,
    artifact_root: &Path,
    rule: &FileRule,
    ctx: &RenderContext,
    seen_targets: &BTreeSet<String>,
) -> Result<String> {
    let source_label = format!("file rule '{}' source", rule.id);
    let target_label = format!("file rule '{}' target", rule.id);
    let source = placeholders::render(&rule.source, ctx, &source_label)?;
    let target = placeholders::render(&rule.target, ctx, &target_label)?;
    let source = normalize_relative_path(&source, &source_label)?;
    let target = normalize_relative_path(&target, &target_label)?;

    let artifact = artifact_root.join(&source);
    if !artifact.is_file() {
        return Err(SetupError::MissingArtifact {
            rule_id: rule.id.clone(),
            artifact: source,
        });
    }
    if seen_targets.contains(&target) {
        return Err(SetupError::DuplicateTarget {
            rule_id: rule.id.clone(),
            target,
        });
    }

    let dest = project_root.join(&target);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|err| SetupError::io("create", parent, err))?;
    }
    fs::copy(&artifact, &dest).map_err(|err| SetupError::io("copy", &artifact, err))?;
    carry_source_mtime(&artifact, &dest)?;
    if rule.executable {
        mark_executable(&dest)?;
    }
    match rule.post_process {
        PostProcess::None => {}
        PostProcess::ReplaceFirstHeadingWithProjectName => {
            replace_first_heading(&dest, &ctx.project_name)?;
        }
    }

    tracing::debug!(rule = %rule.id, %target, "copied artifact");
    Ok(target)
}

fn carry_source_mtime(artifact: &Path, dest: &Path) -> Result<()> {
    let modified = fs::metadata(artifact)
        .and_then(|meta| meta.modified())
        .map_err(|err| SetupError::io("stat", artifact, err))?;
    fs::File::options()
        .write(true)
        .open(dest)
        .and_then(|file| file.set_modified(modified))
        .map_err(|err| SetupError::io("set mtime", dest, err))
}

#[cfg(unix)]
fn mark_executable(dest: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = fs::metadata(dest).map_err(|err| SetupError::io("stat", dest, err))?;
    let mut permissions = metadata.permissions();
    // Add exec bits, keep everything the copy preserved.
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(dest, permissions).map_err(|err| SetupError::io("chmod", dest, err))
}

#[cfg(not(unix))]
fn mark_executable(_dest: &Path) -> Result<()> {
    Ok(())
}

/// Replace the first `#` heading line with the project name, or prepend a new
/// heading when the file does not start with one.
fn replace_first_heading(dest: &Path, project_name: &str) -> Result<()> {
    let contents =
        fs::read_to_string(dest).map_err(|err| SetupError::io("read", dest, err))?;
    let heading = format!("# {project_name}");
    let rewritten = match contents.split_once('\n') {
        Some((first, rest)) if first.starts_with("# ") => format!("{heading}\n{rest}"),
        None if contents.starts_with("# ") => heading,
        _ => format!("{heading}\n\n{contents}"),
    };
    fs::write(dest, rewritten).map_err(|err| SetupError::io("write", dest, err))
}

fn dir_is_empty(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|err| SetupError::io("read", path, err))?;
    Ok(entries.next().is_none())
}

#[cfg(test)]
#[path = "generate_tests.rs"]
mod tests;
