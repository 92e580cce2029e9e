//! Common test utilities for cfbuild integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Repository, Signature, StatusOptions};
use tempfile::TempDir;

/// Module index shared by the integration tests
pub const INDEX: &str = r#"{
  "name": "test-index",
  "type": "index",
  "description": "Modules for tests",
  "index": {
    "masterfiles": {
      "version": "3.21.0",
      "description": "Base policy",
      "files": [
        { "source": "promises.cf", "destination": "promises.cf" },
        { "content": "{}\n", "destination": "def.json" }
      ]
    },
    "autorun": {
      "version": "1.0.0",
      "description": "Enable autorun",
      "tags": ["supported", "management"],
      "dependencies": ["masterfiles"],
      "files": [
        { "content": "{ \"classes\": { \"services_autorun\": [\"any\"] } }\n", "destination": "def.json" }
      ]
    },
    "delete-files": {
      "version": "0.0.2",
      "description": "Delete files",
      "dependencies": ["autorun@1.0.0"],
      "files": [
        {
          "content": "files => {{ files }}\n",
          "destination": "services/autorun/delete_files.cf",
          "template": true
        }
      ],
      "input": [
        {
          "type": "list",
          "variable": "files",
          "label": "Files",
          "subtype": [
            { "key": "path", "type": "string", "label": "Path", "question": "Path to file" },
            { "key": "why", "type": "string", "label": "Why", "question": "Why should this file be deleted?", "default": "Unknown" }
          ],
          "while": "Specify another file you want deleted on your hosts?"
        }
      ]
    },
    "cycle-a": { "version": "1.0.0", "description": "Cycle", "dependencies": ["cycle-b"] },
    "cycle-b": { "version": "1.0.0", "description": "Cycle", "dependencies": ["cycle-a"] }
  }
}
"#;

/// Command for the cfbuild binary, isolated from the developer's environment
#[allow(deprecated)]
pub fn cfbuild_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cfbuild").unwrap();
    cmd.env_remove("CFBUILD_PROJECT");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// An initialized project with [`INDEX`] committed next to its manifest
pub struct TestProject {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the project root
    pub path: PathBuf,
}

impl TestProject {
    /// Run `cfbuild init` in a fresh directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("project");
        std::fs::create_dir_all(&path).expect("Failed to create project directory");

        let project = Self { temp, path };
        project.write_file("index.json", INDEX);
        project.write_file("masterfiles/promises.cf", "bundle agent main {}\n");

        project
            .cmd()
            .args([
                "init",
                "--name",
                "example",
                "--description",
                "Example project",
                "--index",
                "./index.json",
            ])
            .assert()
            .success();
        project.commit_paths(&["index.json", "masterfiles/promises.cf"]);

        project
    }

    /// cfbuild command running in the project directory
    pub fn cmd(&self) -> Command {
        let mut cmd = cfbuild_cmd();
        cmd.current_dir(&self.path);
        cmd
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn read_bytes(&self, path: &str) -> Vec<u8> {
        std::fs::read(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Id of the current commit
    pub fn head(&self) -> String {
        let repo = self.repo();
        let head = repo.head().expect("Repository has no HEAD");
        head.peel_to_commit()
            .expect("HEAD is not a commit")
            .id()
            .to_string()
    }

    pub fn head_message(&self) -> String {
        let repo = self.repo();
        let commit = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("HEAD is not a commit");
        commit.message().unwrap_or_default().to_string()
    }

    /// Whether the work tree has no staged, modified or untracked files
    pub fn is_clean(&self) -> bool {
        let repo = self.repo();
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        repo.statuses(Some(&mut options))
            .expect("Failed to read status")
            .is_empty()
    }

    fn repo(&self) -> Repository {
        Repository::open(&self.path).expect("Project is not a git repository")
    }

    /// Commit files the tests add next to the project
    fn commit_paths(&self, paths: &[&str]) {
        let repo = self.repo();
        let mut index = repo.index().expect("Failed to open git index");
        for path in paths {
            index.add_path(Path::new(path)).expect("Failed to stage file");
        }
        index.write().expect("Failed to write git index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("HEAD is not a commit");
        let signature = Signature::now("test", "test@example.com").expect("Bad signature");
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            "Add module index",
            &tree,
            &[&parent],
        )
        .expect("Failed to commit");
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
