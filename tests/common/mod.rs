//! Shared fixture for end-to-end CLI tests.
//!
//! Each fixture is an isolated temp workspace with a configurations root,
//! an artifacts root, and a destination directory, driven through the real
//! `pforge` binary.
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub struct Workspace {
    _temp: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create workspace tempdir");
        let root = temp.path().to_path_buf();
        fs::create_dir_all(root.join("configurations")).expect("create configurations root");
        fs::create_dir_all(root.join("artifacts")).expect("create artifacts root");
        fs::create_dir_all(root.join("dest")).expect("create dest dir");
        Workspace { _temp: temp, root }
    }

    pub fn configurations_root(&self) -> PathBuf {
        self.root.join("configurations")
    }

    pub fn artifacts_root(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    pub fn dest(&self) -> PathBuf {
        self.root.join("dest")
    }

    pub fn write_file(&self, rel: &str, contents: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(path, contents).expect("write fixture file");
    }

    /// Seed a minimal owner configuration plus matching index and artifacts.
    pub fn seed_web_app(&self) {
        self.write_file(
            "configurations/owner/web_app.json",
            r#"{
  "id": "web_app",
  "name": "Web App",
  "description": "Full-stack starter",
  "folders": ["backend", "frontend"],
  "files": [
    {"id": "root_gitignore", "source": ".gitignore", "target": ".gitignore"},
    {
      "id": "root_readme",
      "source": "readmes/{lang_folder}/README_root.md",
      "target": "README.md",
      "post_process": "replace_first_heading_with_project_name"
    }
  ],
  "behavior": {"add_gitkeep_to_empty_folders": true}
}
"#,
        );
        self.write_file(
            "configurations/index.json",
            r#"{
  "version": 1,
  "description": "test registry",
  "configurations": [
    {"id": "web_app", "path": "owner/web_app.json", "scope": "owner"}
  ]
}
"#,
        );
        self.write_file("artifacts/.gitignore", "target/\nnode_modules/\n");
        self.write_file(
            "artifacts/readmes/en/README_root.md",
            "# Old Title\n\nStarter README.\n",
        );
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pforge"))
            .args(args)
            .current_dir(&self.root)
            .output()
            .expect("run pforge")
    }

    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "pforge {args:?} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }
}

pub fn read_generated(workspace: &Workspace, project: &str, rel: &str) -> String {
    let path = workspace.dest().join(project).join(rel);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}
