//! Requirement document validation and traceability links.
//!
//! Unlike configuration loading, validation here collects issues and keeps
//! going: malformed entries are skipped, everything else flows into the
//! cleaned lists and the link index, and the caller decides whether any issue
//! is fatal.
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const ALLOWED_STATUSES: [&str; 4] = ["draft", "in progress", "in review", "finished"];

#[derive(Debug, Clone, Serialize)]
pub struct Requirement {
    pub id: String,
    pub name: String,
    pub status: String,
    pub description: String,
    pub refines: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    HighLevel,
    Software,
}

impl RequirementKind {
    pub fn label(self) -> &'static str {
        match self {
            RequirementKind::HighLevel => "High-level",
            RequirementKind::Software => "Software",
        }
    }

    fn requires_refines(self) -> bool {
        matches!(self, RequirementKind::Software)
    }
}

/// A recorded validation problem. Schema issues describe one entry; dangling
/// references are aggregated over the whole software list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementIssue {
    Schema { message: String },
    DanglingReferences { ids: Vec<String> },
}

impl fmt::Display for RequirementIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementIssue::Schema { message } => write!(f, "{message}"),
            RequirementIssue::DanglingReferences { ids } => write!(
                f,
                "Dangling software requirements (no matching high-level refines): {}",
                ids.join(", ")
            ),
        }
    }
}

/// Forward: software id -> high-level id it refines.
/// Backward: high-level id -> software ids refining it (possibly empty).
/// The two maps are symmetric by construction.
#[derive(Debug, Default)]
pub struct LinkIndex {
    pub forward: BTreeMap<String, String>,
    pub backward: BTreeMap<String, Vec<String>>,
}

#[derive(Debug)]
pub struct ValidationReport {
    pub high_level: Vec<Requirement>,
    pub software: Vec<Requirement>,
    pub links: LinkIndex,
    pub issues: Vec<RequirementIssue>,
}

/// Validate both requirement documents and build the traceability index.
pub fn validate(high_level_doc: &Value, software_doc: &Value) -> ValidationReport {
    let mut issues = Vec::new();
    let high_level = clean_list(high_level_doc, RequirementKind::HighLevel, &mut issues);
    let software = clean_list(software_doc, RequirementKind::Software, &mut issues);

    let mut links = LinkIndex::default();
    for requirement in &high_level {
        links.backward.insert(requirement.id.clone(), Vec::new());
    }

    let mut dangling = Vec::new();
    for requirement in &software {
        match requirement.refines.as_deref() {
            Some(refines) if links.backward.contains_key(refines) => {
                links
                    .forward
                    .insert(requirement.id.clone(), refines.to_string());
                links
                    .backward
                    .get_mut(refines)
                    .expect("backward entry exists for known high-level id")
                    .push(requirement.id.clone());
            }
            _ => dangling.push(requirement.id.clone()),
        }
    }
    if !dangling.is_empty() {
        issues.push(RequirementIssue::DanglingReferences { ids: dangling });
    }

    ValidationReport {
        high_level,
        software,
        links,
        issues,
    }
}

/// Clean one requirement list. Invalid entries are recorded and skipped; an
/// unknown status is recorded but keeps its entry (status is advisory).
pub fn clean_list(
    doc: &Value,
    kind: RequirementKind,
    issues: &mut Vec<RequirementIssue>,
) -> Vec<Requirement> {
    let label = kind.label();
    let entries = match doc {
        Value::Null => return Vec::new(),
        Value::Sequence(entries) => entries,
        _ => {
            issues.push(schema_issue(format!(
                "{label} requirements YAML must be a list of entries"
            )));
            return Vec::new();
        }
    };

    let mut cleaned: Vec<Requirement> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let Value::Mapping(_) = entry else {
            issues.push(schema_issue(format!("{label}[{index}] must be a mapping")));
            continue;
        };

        let mut required = vec!["id", "name", "status", "description"];
        if kind.requires_refines() {
            required.push("refines");
        }
        let missing: Vec<&str> = required
            .iter()
            .filter(|key| field(entry, key).is_none())
            .copied()
            .collect();
        if !missing.is_empty() {
            issues.push(schema_issue(format!(
                "{label}[{index}] missing required fields: {}",
                missing.join(", ")
            )));
            continue;
        }

        let id = field(entry, "id").expect("id checked above");
        if cleaned.iter().any(|existing| existing.id == id) {
            issues.push(schema_issue(format!("{label} duplicate id '{id}'")));
            continue;
        }

        let status = field(entry, "status").expect("status checked above");
        if !ALLOWED_STATUSES.contains(&status.to_lowercase().as_str()) {
            issues.push(schema_issue(format!(
                "{label} '{id}' has unknown status '{status}'"
            )));
        }

        cleaned.push(Requirement {
            id,
            name: field(entry, "name").expect("name checked above"),
            status,
            description: field(entry, "description").expect("description checked above"),
            refines: field(entry, "refines"),
        });
    }
    cleaned
}

fn schema_issue(message: String) -> RequirementIssue {
    RequirementIssue::Schema { message }
}

/// Fetch a scalar field as a non-empty string.
fn field(entry: &Value, key: &str) -> Option<String> {
    let value = entry.get(key)?;
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Some(text)
}

#[cfg(test)]
#[path = "requirements_tests.rs"]
mod tests;
