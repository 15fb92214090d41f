//! Configuration schema, defaults, and normalization.
//!
//! Raw documents are deserialized into permissive `Raw*` types and then
//! normalized into the canonical structures used by the rest of the tool.
//! Normalization is fail-fast: the first invalid field aborts with a single
//! descriptive error and no partially normalized configuration escapes.
use crate::error::{Result, SetupError};
use crate::paths::normalize_relative_path;
use crate::placeholders;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Canonical configuration after normalization. Never mutated in place;
/// every load produces a fresh value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub name: String,
    pub description: String,
    pub folders: Vec<String>,
    pub files: Vec<FileRule>,
    pub runtime: RuntimeSettings,
    pub behavior: BehaviorSettings,
}

/// One file-generation instruction: copy `source` (relative to the artifact
/// root) to `target` (relative to the generated project root).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRule {
    pub id: String,
    pub source: String,
    pub target: String,
    pub enabled: bool,
    pub executable: bool,
    pub post_process: PostProcess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostProcess {
    None,
    ReplaceFirstHeadingWithProjectName,
}

/// Inputs the external provisioning step needs (venv creation and package
/// install are collaborator concerns, not performed here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pub setup_docs_venv: bool,
    pub docs_venv_path: String,
    pub docs_packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSettings {
    pub add_gitkeep_to_empty_folders: bool,
}

/// Fresh runtime defaults per call so repeated loads never share state.
pub fn default_runtime_settings() -> RuntimeSettings {
    RuntimeSettings {
        setup_docs_venv: true,
        docs_venv_path: "Automation/docs_venv".to_string(),
        docs_packages: vec!["pyyaml".to_string(), "requests".to_string()],
    }
}

pub fn default_behavior_settings() -> BehaviorSettings {
    BehaviorSettings {
        add_gitkeep_to_empty_folders: true,
    }
}

/// Starter configuration used by `pforge stub` as an editable template.
pub fn starter_configuration() -> Configuration {
    let folders = [
        ".vscode",
        "Automation",
        "Docs",
        "Docs/requirements",
        "Docs/architecture",
        "backend",
        "frontend",
    ];
    let files = [
        ("vscode_settings", ".vscode/settings.json", ".vscode/settings.json", false, PostProcess::None),
        ("docs_builder", "scripts/docs_builder.py", "Automation/docs_builder.py", true, PostProcess::None),
        ("high_level_requirements", "docs/requirements/high_level_requirements.yaml", "Docs/requirements/high_level_requirements.yaml", false, PostProcess::None),
        ("software_requirements", "docs/requirements/software_requirements.yaml", "Docs/requirements/software_requirements.yaml", false, PostProcess::None),
        ("runtime_diagram", "docs/architecture/runtime_diagram.puml", "Docs/architecture/runtime_diagram.puml", false, PostProcess::None),
        ("class_diagram", "docs/architecture/class_diagram.puml", "Docs/architecture/class_diagram.puml", false, PostProcess::None),
        ("block_diagram", "docs/architecture/block_diagram.puml", "Docs/architecture/block_diagram.puml", false, PostProcess::None),
        ("agents_md", "readmes/{lang_folder}/AGENTS.md", "AGENTS.md", false, PostProcess::None),
        ("root_readme", "readmes/{lang_folder}/README_root.md", "README.md", false, PostProcess::ReplaceFirstHeadingWithProjectName),
        ("root_gitignore", ".gitignore", ".gitignore", false, PostProcess::None),
        ("setup_script", "scripts/setup.sh", "setup.sh", true, PostProcess::None),
        ("start_script", "scripts/start.sh", "start.sh", true, PostProcess::None),
    ];
    Configuration {
        id: "web_app".to_string(),
        name: "Web App".to_string(),
        description: "Full-stack starter with docs workflow".to_string(),
        folders: folders.iter().map(|s| s.to_string()).collect(),
        files: files
            .iter()
            .map(|(id, source, target, executable, post_process)| FileRule {
                id: id.to_string(),
                source: source.to_string(),
                target: target.to_string(),
                enabled: true,
                executable: *executable,
                post_process: *post_process,
            })
            .collect(),
        runtime: default_runtime_settings(),
        behavior: default_behavior_settings(),
    }
}

/// Render a pretty JSON stub for new configurations.
pub fn configuration_stub() -> String {
    serde_json::to_string_pretty(&starter_configuration()).expect("serialize configuration stub")
}

#[derive(Debug, Deserialize)]
pub struct RawConfiguration {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub files: Vec<RawFileRule>,
    #[serde(default)]
    pub runtime: Option<RawRuntimeSettings>,
    #[serde(default)]
    pub behavior: Option<RawBehaviorSettings>,
}

#[derive(Debug, Deserialize)]
pub struct RawFileRule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub executable: Option<bool>,
    #[serde(default)]
    pub post_process: Option<PostProcess>,
}

#[derive(Debug, Deserialize)]
pub struct RawRuntimeSettings {
    #[serde(default)]
    pub setup_docs_venv: Option<bool>,
    #[serde(default)]
    pub docs_venv_path: Option<String>,
    #[serde(default)]
    pub docs_packages: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RawBehaviorSettings {
    #[serde(default)]
    pub add_gitkeep_to_empty_folders: Option<bool>,
}

/// Collapse a raw identifier to lowercase snake case.
///
/// Spaces and hyphens map to underscores, anything outside `[a-z0-9_]` is
/// dropped, and runs of underscores collapse to one.
pub fn normalize_config_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().to_lowercase().chars() {
        let mapped = match ch {
            ' ' | '-' => Some('_'),
            'a'..='z' | '0'..='9' | '_' => Some(ch),
            _ => None,
        };
        if let Some(mapped) = mapped {
            if mapped == '_' && out.ends_with('_') {
                continue;
            }
            out.push(mapped);
        }
    }
    out.trim_matches('_').to_string()
}

/// Normalize a raw document into a canonical `Configuration`.
pub fn normalize(raw: RawConfiguration) -> Result<Configuration> {
    let id = normalize_config_id(&raw.id);
    if id.is_empty() {
        return Err(SetupError::MissingIdentifier);
    }

    let name = raw
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| id.clone());
    let description = raw
        .description
        .map(|description| description.trim().to_string())
        .unwrap_or_default();

    Ok(Configuration {
        id,
        name,
        description,
        folders: normalize_folders(&raw.folders)?,
        files: normalize_files(raw.files)?,
        runtime: normalize_runtime(raw.runtime)?,
        behavior: normalize_behavior(raw.behavior),
    })
}

/// Load and normalize a configuration JSON document from disk.
pub fn load(path: &Path, label: &str) -> Result<Configuration> {
    let bytes = fs::read(path).map_err(|err| SetupError::io("read", path, err))?;
    let raw: RawConfiguration =
        serde_json::from_slice(&bytes).map_err(|err| SetupError::Json {
            label: label.to_string(),
            source: err,
        })?;
    normalize(raw)
}

fn normalize_folders(raw_folders: &[String]) -> Result<Vec<String>> {
    let mut normalized = Vec::new();
    let mut seen = BTreeSet::new();
    for item in raw_folders {
        let folder = normalize_relative_path(item, "folder path")?;
        // First occurrence wins, declaration order preserved.
        if seen.insert(folder.clone()) {
            normalized.push(folder);
        }
    }
    Ok(normalized)
}

fn normalize_files(raw_files: Vec<RawFileRule>) -> Result<Vec<FileRule>> {
    let mut normalized = Vec::new();
    let mut seen_ids = BTreeSet::new();
    for (index, raw_rule) in raw_files.into_iter().enumerate() {
        let rule = normalize_file_rule(raw_rule, index)?;
        if !seen_ids.insert(rule.id.clone()) {
            return Err(SetupError::DuplicateRuleId { id: rule.id });
        }
        normalized.push(rule);
    }
    Ok(normalized)
}

fn normalize_file_rule(raw: RawFileRule, index: usize) -> Result<FileRule> {
    let id = raw
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("rule_{}", index + 1));

    let source = required_template(raw.source, &id, "source")?;
    let target = required_template(raw.target, &id, "target")?;
    placeholders::validate(&source, &format!("file rule '{id}' source"))?;
    placeholders::validate(&target, &format!("file rule '{id}' target"))?;

    Ok(FileRule {
        id,
        source,
        target,
        enabled: raw.enabled.unwrap_or(true),
        executable: raw.executable.unwrap_or(false),
        post_process: raw.post_process.unwrap_or(PostProcess::None),
    })
}

fn required_template(value: Option<String>, rule_id: &str, field: &str) -> Result<String> {
    let value = value.map(|value| value.trim().replace('\\', "/"));
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SetupError::schema(format!(
            "file rule '{rule_id}' requires a non-empty string '{field}'"
        ))),
    }
}

fn normalize_runtime(raw: Option<RawRuntimeSettings>) -> Result<RuntimeSettings> {
    let mut settings = default_runtime_settings();
    let Some(raw) = raw else {
        return Ok(settings);
    };
    if let Some(setup_docs_venv) = raw.setup_docs_venv {
        settings.setup_docs_venv = setup_docs_venv;
    }
    if let Some(docs_venv_path) = raw.docs_venv_path {
        settings.docs_venv_path = normalize_relative_path(&docs_venv_path, "runtime.docs_venv_path")?;
    }
    if let Some(docs_packages) = raw.docs_packages {
        settings.docs_packages = docs_packages
            .iter()
            .map(|package| package.trim().to_string())
            .filter(|package| !package.is_empty())
            .collect();
    }
    Ok(settings)
}

fn normalize_behavior(raw: Option<RawBehaviorSettings>) -> BehaviorSettings {
    let mut settings = default_behavior_settings();
    if let Some(raw) = raw {
        if let Some(add_gitkeep) = raw.add_gitkeep_to_empty_folders {
            settings.add_gitkeep_to_empty_folders = add_gitkeep;
        }
    }
    settings
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
