use super::{validate, RequirementIssue};
use serde_yaml::Value;

fn doc(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).expect("parse YAML document")
}

const HIGH_LEVEL: &str = r#"
- id: REQ-001
  name: Basic Application Setup
  status: Draft
  description: Set up the basic application structure.
- id: REQ-002
  name: Documentation Workflow
  status: In Review
  description: Keep requirement docs in sync.
"#;

#[test]
fn builds_symmetric_links() {
    let software = doc(r#"
- id: REQ-SW-001
  name: Core Component Functionality
  status: Draft
  refines: REQ-001
  description: Implement basic functionality.
- id: REQ-SW-002
  name: Docs Build
  status: In Progress
  refines: REQ-001
  description: Build HTML docs.
"#);
    let report = validate(&doc(HIGH_LEVEL), &software);

    assert!(report.issues.is_empty(), "unexpected issues: {:?}", report.issues);
    assert_eq!(report.links.forward.get("REQ-SW-001").unwrap(), "REQ-001");
    assert_eq!(
        report.links.backward.get("REQ-001").unwrap(),
        &vec!["REQ-SW-001".to_string(), "REQ-SW-002".to_string()]
    );
    // Every high-level id gets a backward entry, even with no refiners.
    assert!(report.links.backward.get("REQ-002").unwrap().is_empty());

    // Symmetry: forward and backward describe the same edges.
    for (sw, hl) in &report.links.forward {
        assert!(report.links.backward.get(hl).unwrap().contains(sw));
    }
}

#[test]
fn dangling_refines_is_aggregated_and_entry_kept() {
    let software = doc(r#"
- id: REQ-SW-001
  name: Orphan
  status: Draft
  refines: REQ-999
  description: Points at nothing.
"#);
    let report = validate(&doc(HIGH_LEVEL), &software);

    assert_eq!(report.software.len(), 1, "dangling entry stays in cleaned list");
    assert!(!report.links.forward.contains_key("REQ-SW-001"));
    assert!(report.issues.iter().any(|issue| matches!(
        issue,
        RequirementIssue::DanglingReferences { ids } if ids == &vec!["REQ-SW-001".to_string()]
    )));
}

#[test]
fn malformed_entries_are_skipped_but_validation_continues() {
    let high = doc(r#"
- just a string
- id: REQ-001
  name: Valid
  status: Draft
  description: Fine.
- id: REQ-002
  name: Missing description
  status: Draft
"#);
    let report = validate(&high, &Value::Null);

    assert_eq!(report.high_level.len(), 1);
    assert_eq!(report.high_level[0].id, "REQ-001");
    let messages: Vec<String> = report.issues.iter().map(|issue| issue.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("[0] must be a mapping")));
    assert!(messages.iter().any(|m| m.contains("missing required fields: description")));
}

#[test]
fn duplicate_ids_keep_first_occurrence() {
    let high = doc(r#"
- id: REQ-001
  name: First
  status: Draft
  description: Original.
- id: REQ-001
  name: Second
  status: Draft
  description: Duplicate.
"#);
    let report = validate(&high, &Value::Null);

    assert_eq!(report.high_level.len(), 1);
    assert_eq!(report.high_level[0].name, "First");
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.to_string().contains("duplicate id 'REQ-001'")));
}

#[test]
fn unknown_status_is_reported_but_entry_participates_in_links() {
    let software = doc(r#"
- id: REQ-SW-001
  name: Odd Status
  status: Done
  refines: REQ-001
  description: Uses an undefined status.
"#);
    let report = validate(&doc(HIGH_LEVEL), &software);

    assert_eq!(report.software.len(), 1);
    assert!(report.links.forward.contains_key("REQ-SW-001"));
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.to_string().contains("unknown status 'Done'")));
}

#[test]
fn status_matching_is_case_insensitive() {
    let high = doc(r#"
- id: REQ-001
  name: Mixed Case
  status: IN PROGRESS
  description: Status case must not matter.
"#);
    let report = validate(&high, &Value::Null);
    assert!(report.issues.is_empty());
}

#[test]
fn non_list_document_is_an_issue_and_null_is_empty() {
    let report = validate(&doc("key: value"), &Value::Null);
    assert!(report.high_level.is_empty());
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.to_string().contains("must be a list")));
}
