//! Shared fixtures for operation tests

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::history::{GitHistory, History};
use crate::operations::{InitOptions, init_project};

/// Module index used by the operation tests
pub const INDEX: &str = r#"{
  "name": "test-index",
  "type": "index",
  "description": "Modules for tests",
  "index": {
    "masterfiles": {
      "version": "3.21.0",
      "description": "Base policy",
      "files": [
        { "content": "bundle agent main {}\n", "destination": "promises.cf" },
        { "content": "{}\n", "destination": "def.json" }
      ]
    },
    "autorun": {
      "version": "1.0.0",
      "description": "Enable autorun",
      "dependencies": ["masterfiles"],
      "files": [
        { "content": "{ \"classes\": { \"services_autorun\": [\"any\"] } }\n", "destination": "def.json" }
      ]
    },
    "delete-files": [
      {
        "version": "0.0.1",
        "description": "Delete files (old)",
        "dependencies": ["autorun@1.0.0"],
        "files": []
      },
      {
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
            "namespace": "delete_files",
            "bundle": "delete_files",
            "label": "Files",
            "subtype": [
              { "key": "path", "type": "string", "label": "Path", "question": "Path to file" },
              { "key": "why", "type": "string", "label": "Why", "question": "Why should this file be deleted?", "default": "Unknown" }
            ],
            "while": "Specify another file you want deleted on your hosts?"
          }
        ]
      }
    ],
    "rm": { "alias": "delete-files" },
    "cycle-a": { "version": "1.0.0", "description": "Cycle", "dependencies": ["cycle-b"] },
    "cycle-b": { "version": "1.0.0", "description": "Cycle", "dependencies": ["cycle-a"] }
  }
}
"#;

/// A fresh project with [`INDEX`] next to its manifest
pub fn create_project() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    fs::create_dir_all(&root).unwrap();
    write_index(&root);

    let options = InitOptions {
        name: Some("example".to_string()),
        description: Some("Example project".to_string()),
        index: Some("./index.json".to_string()),
    };
    init_project(&root, &options).unwrap();
    commit_index(&root);

    (temp, root)
}

fn write_index(root: &Path) {
    fs::write(root.join("index.json"), INDEX).unwrap();
}

/// Track the index so the work tree starts clean
fn commit_index(root: &Path) {
    GitHistory::open(root)
        .unwrap()
        .commit(&[PathBuf::from("index.json")], "Add module index")
        .unwrap();
}
