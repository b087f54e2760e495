#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use cliventory::{ExecutorResult, Invocation};

pub const PACKAGE_JSON: &str = r#"{
  "name": "tool-pkg",
  "version": "1.0.0",
  "description": "Operations helper",
  "bin": { "tool": "./bin/tool" }
}"#;

/// Working directory with an inventory and a package manifest.
pub fn project(inventory: &str, package_json: &str) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    write(dir.path(), "cliventory.yml", inventory);
    write(dir.path(), "package.json", package_json);
    dir
}

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(&path, content).expect("write file");
    path
}

#[cfg(unix)]
pub fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod");
}

/// Records every invocation it receives and returns `code`.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl Recorder {
    pub fn executor(&self, code: i32) -> impl Fn(&Invocation) -> ExecutorResult + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |invocation: &Invocation| -> ExecutorResult {
            calls.lock().expect("lock").push(invocation.clone());
            Ok(code)
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock").clone()
    }
}
