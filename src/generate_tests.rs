use super::generate;
use crate::config::{normalize, RawConfiguration};
use crate::error::SetupError;
use crate::placeholders::RenderContext;
use std::fs;
use std::path::Path;

fn ctx() -> RenderContext {
    RenderContext::new("en", "en", "Demo")
}

fn config_from(json: &str) -> crate::config::Configuration {
    let raw: RawConfiguration = serde_json::from_str(json).expect("parse configuration");
    normalize(raw).expect("normalize configuration")
}

fn write_artifact(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create artifact parent");
    }
    fs::write(path, contents).expect("write artifact");
}

#[test]
fn generates_folders_copies_and_markers() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(artifacts.path(), ".gitignore", "target/\n");

    let config = config_from(
        r#"{
            "id": "web_app",
            "folders": ["backend", "frontend"],
            "files": [{"id": "root_gitignore", "source": ".gitignore", "target": ".gitignore"}],
            "behavior": {"add_gitkeep_to_empty_folders": true}
        }"#,
    );
    let generated = generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");

    assert_eq!(
        generated,
        vec![".gitignore", "backend/.gitkeep", "frontend/.gitkeep"]
    );
    assert_eq!(
        fs::read_to_string(project.path().join(".gitignore")).expect("read copy"),
        "target/\n"
    );
    assert!(project.path().join("backend/.gitkeep").exists());
}

#[test]
fn populated_folders_get_no_marker() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(artifacts.path(), "scripts/setup.sh", "#!/bin/bash\n");

    let config = config_from(
        r#"{
            "id": "web_app",
            "folders": ["Automation", "backend"],
            "files": [{"id": "setup", "source": "scripts/setup.sh", "target": "Automation/setup.sh"}]
        }"#,
    );
    let generated = generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");

    assert!(generated.contains(&"Automation/setup.sh".to_string()));
    assert!(!project.path().join("Automation/.gitkeep").exists());
    assert!(project.path().join("backend/.gitkeep").exists());
}

#[test]
fn gitkeep_can_be_disabled() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    let config = config_from(
        r#"{
            "id": "web_app",
            "folders": ["backend"],
            "behavior": {"add_gitkeep_to_empty_folders": false}
        }"#,
    );
    let generated = generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");
    assert!(generated.is_empty());
    assert!(!project.path().join("backend/.gitkeep").exists());
}

#[test]
fn duplicate_rendered_target_fails_and_second_rule_writes_nothing() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(artifacts.path(), "readmes/en/README_root.md", "# Old Title\nbody\n");
    write_artifact(artifacts.path(), "readmes/sr/README_root.md", "# Stari Naslov\nbody\n");

    let config = config_from(
        r#"{
            "id": "web_app",
            "files": [
                {"id": "first", "source": "readmes/en/README_root.md", "target": "README.md"},
                {"id": "second", "source": "readmes/sr/README_root.md", "target": "README.md"}
            ]
        }"#,
    );
    let err = generate(project.path(), artifacts.path(), &config, &ctx()).unwrap_err();
    match err {
        SetupError::DuplicateTarget { rule_id, target } => {
            assert_eq!(rule_id, "second");
            assert_eq!(target, "README.md");
        }
        other => panic!("expected DuplicateTarget, got {other}"),
    }
    // The first rule's copy is intact; the failed rule wrote nothing over it.
    assert_eq!(
        fs::read_to_string(project.path().join("README.md")).expect("read first copy"),
        "# Old Title\nbody\n"
    );
}

#[test]
fn missing_artifact_fails_with_rendered_source() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    let config = config_from(
        r#"{
            "id": "web_app",
            "files": [{"id": "agents", "source": "readmes/{lang_folder}/AGENTS.md", "target": "AGENTS.md"}]
        }"#,
    );
    let err = generate(project.path(), artifacts.path(), &config, &ctx()).unwrap_err();
    match err {
        SetupError::MissingArtifact {
            rule_id,
            artifact: source,
        } => {
            assert_eq!(rule_id, "agents");
            assert_eq!(source, "readmes/en/AGENTS.md");
        }
        other => panic!("expected MissingArtifact, got {other}"),
    }
}

#[test]
fn heading_post_process_replaces_first_heading() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(
        artifacts.path(),
        "readmes/en/README_root.md",
        "# Old Title\n\nProject intro.\n",
    );

    let config = config_from(
        r#"{
            "id": "web_app",
            "files": [{
                "id": "root_readme",
                "source": "readmes/{lang_folder}/README_root.md",
                "target": "README.md",
                "post_process": "replace_first_heading_with_project_name"
            }]
        }"#,
    );
    generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");

    let readme = fs::read_to_string(project.path().join("README.md")).expect("read readme");
    assert_eq!(readme, "# Demo\n\nProject intro.\n");
}

#[test]
fn heading_post_process_prepends_when_no_heading() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(artifacts.path(), "notes.md", "Plain intro line.\n");

    let config = config_from(
        r#"{
            "id": "web_app",
            "files": [{
                "id": "notes",
                "source": "notes.md",
                "target": "NOTES.md",
                "post_process": "replace_first_heading_with_project_name"
            }]
        }"#,
    );
    generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");

    let notes = fs::read_to_string(project.path().join("NOTES.md")).expect("read notes");
    assert_eq!(notes, "# Demo\n\nPlain intro line.\n");
}

#[test]
fn copies_carry_the_artifact_mtime() {
    use std::time::{Duration, SystemTime};

    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(artifacts.path(), "notes.md", "notes\n");

    // Whole seconds so filesystem timestamp granularity cannot bite.
    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    fs::File::options()
        .write(true)
        .open(artifacts.path().join("notes.md"))
        .and_then(|file| file.set_modified(stamp))
        .expect("set artifact mtime");

    let config = config_from(
        r#"{"id": "web_app", "files": [{"id": "notes", "source": "notes.md", "target": "notes.md"}]}"#,
    );
    generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");

    let copied = fs::metadata(project.path().join("notes.md"))
        .expect("stat copy")
        .modified()
        .expect("copy mtime");
    assert_eq!(copied, stamp);
}

#[cfg(unix)]
#[test]
fn executable_rules_add_exec_bits() {
    use std::os::unix::fs::PermissionsExt;

    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    write_artifact(artifacts.path(), "scripts/setup.sh", "#!/bin/bash\n");

    let config = config_from(
        r#"{
            "id": "web_app",
            "files": [{"id": "setup", "source": "scripts/setup.sh", "target": "setup.sh", "executable": true}]
        }"#,
    );
    generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");

    let mode = fs::metadata(project.path().join("setup.sh"))
        .expect("stat setup.sh")
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn disabled_rules_are_skipped() {
    let artifacts = tempfile::tempdir().expect("artifacts dir");
    let project = tempfile::tempdir().expect("project dir");
    let config = config_from(
        r#"{
            "id": "web_app",
            "files": [{"id": "off", "source": "missing.txt", "target": "missing.txt", "enabled": false}]
        }"#,
    );
    // A disabled rule is never rendered or resolved, so the missing artifact
    // does not fail the run.
    let generated = generate(project.path(), artifacts.path(), &config, &ctx()).expect("generate");
    assert!(generated.is_empty());
}
