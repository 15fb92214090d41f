//! Registry index linking configuration ids to their documents.
//!
//! The index lives at `<configurations_root>/index.json` and carries one entry
//! per configuration with its scope. Owner configurations ship with the tool;
//! user-generated ones are written by `pforge register` and may never shadow
//! an owner id.
use crate::config::{self, Configuration};
use crate::error::{Result, SetupError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Owner,
    UserGenerated,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Owner => "owner",
            Scope::UserGenerated => "user_generated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub path: String,
    pub scope: Scope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryIndex {
    pub version: u32,
    pub description: String,
    pub configurations: Vec<RegistryEntry>,
}

impl RegistryIndex {
    pub fn empty() -> Self {
        RegistryIndex {
            version: 1,
            description: "Main registry that links all project setup configurations.".to_string(),
            configurations: Vec::new(),
        }
    }
}

/// A configuration loaded through the registry, with its provenance attached.
#[derive(Debug, Clone)]
pub struct RegisteredConfiguration {
    pub configuration: Configuration,
    pub scope: Scope,
    pub path: String,
}

/// Read and parse the index document.
pub fn load_index(configurations_root: &Path) -> Result<RegistryIndex> {
    let path = configurations_root.join(INDEX_FILE);
    let bytes = fs::read(&path).map_err(|err| SetupError::io("read", &path, err))?;
    serde_json::from_slice(&bytes).map_err(|err| SetupError::Json {
        label: "configuration index".to_string(),
        source: err,
    })
}

/// Load every configuration referenced by the index.
///
/// Fail-fast: any invalid entry or referenced document aborts the whole load.
/// The result is sorted owner-first, then by case-insensitive display name,
/// which is the presentation order for selection UIs built on top.
pub fn load(configurations_root: &Path) -> Result<Vec<RegisteredConfiguration>> {
    let index = load_index(configurations_root)?;
    if index.configurations.is_empty() {
        return Err(SetupError::schema(
            "configuration index lists no configurations",
        ));
    }

    let mut loaded = Vec::with_capacity(index.configurations.len());
    for entry in &index.configurations {
        let entry_id = entry.id.trim();
        if entry_id.is_empty() || entry.path.trim().is_empty() {
            return Err(SetupError::schema(
                "each index entry requires 'id' and 'path'",
            ));
        }
        if loaded
            .iter()
            .any(|existing: &RegisteredConfiguration| existing.configuration.id == entry_id)
        {
            return Err(SetupError::DuplicateIdentifier {
                id: entry_id.to_string(),
            });
        }

        let config_path = resolve_entry_path(configurations_root, &entry.path)?;
        let configuration =
            config::load(&config_path, &format!("configuration '{entry_id}'"))?;
        if configuration.id != entry_id {
            return Err(SetupError::IdentifierMismatch {
                expected: entry_id.to_string(),
                found: configuration.id,
            });
        }

        tracing::debug!(id = %configuration.id, scope = entry.scope.as_str(), "loaded configuration");
        loaded.push(RegisteredConfiguration {
            configuration,
            scope: entry.scope,
            path: entry.path.clone(),
        });
    }

    loaded.sort_by(|a, b| {
        let rank = |scope: Scope| if scope == Scope::Owner { 0 } else { 1 };
        rank(a.scope)
            .cmp(&rank(b.scope))
            .then_with(|| {
                a.configuration
                    .name
                    .to_lowercase()
                    .cmp(&b.configuration.name.to_lowercase())
            })
    });
    Ok(loaded)
}

/// Resolve an index entry path, refusing anything that leaves the root.
pub fn resolve_entry_path(configurations_root: &Path, rel: &str) -> Result<PathBuf> {
    let rel = rel.trim();
    let path = Path::new(rel);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if rel.is_empty() || escapes {
        return Err(SetupError::PathEscape {
            path: rel.to_string(),
        });
    }
    Ok(configurations_root.join(rel))
}

/// What `register` should do with an entry for `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertDisposition {
    Append,
    /// An entry exists; overwriting requires the caller's explicit confirmation.
    Overwrite { index: usize },
}

/// Decide how a new entry fits into the existing entries.
///
/// Owner entries are immutable from the user-generated side; everything else
/// is an overwrite the caller must confirm before applying.
pub fn plan_upsert(
    entries: &[RegistryEntry],
    id: &str,
    scope: Scope,
) -> Result<UpsertDisposition> {
    let Some(index) = entries.iter().position(|entry| entry.id.trim() == id) else {
        return Ok(UpsertDisposition::Append);
    };
    if entries[index].scope == Scope::Owner && scope == Scope::UserGenerated {
        return Err(SetupError::OwnerConflict { id: id.to_string() });
    }
    Ok(UpsertDisposition::Overwrite { index })
}

/// Write the index with entries in stable file order (owner first, then id).
pub fn save_index(configurations_root: &Path, index: &mut RegistryIndex) -> Result<()> {
    index.configurations.sort_by(|a, b| {
        let rank = |scope: Scope| if scope == Scope::Owner { 0 } else { 1 };
        rank(a.scope)
            .cmp(&rank(b.scope))
            .then_with(|| a.id.to_lowercase().cmp(&b.id.to_lowercase()))
    });
    let path = configurations_root.join(INDEX_FILE);
    let mut text = serde_json::to_string_pretty(index).map_err(|err| SetupError::Json {
        label: "configuration index".to_string(),
        source: err,
    })?;
    text.push('\n');
    fs::write(&path, text).map_err(|err| SetupError::io("write", &path, err))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
