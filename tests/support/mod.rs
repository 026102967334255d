#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;
use thesis::store::ThesisStore;

pub fn thesis_cmd() -> Command {
    let mut cmd = Command::cargo_bin("thesis").expect("thesis binary");
    cmd.env_remove("THESIS_ROOT").env_remove("RUST_LOG");
    cmd
}

/// Scratch directory acting as a thesis root.
pub struct TestRoot {
    dir: TempDir,
}

impl TestRoot {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    /// A root with `thesis init` already applied.
    pub fn init() -> Self {
        let root = Self::new();
        ThesisStore::init(root.path()).expect("init store");
        root
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> ThesisStore {
        ThesisStore::open(self.path()).expect("open store")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.path().join(".thesis.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = thesis_cmd();
        cmd.current_dir(self.path());
        cmd
    }

    /// Run with `--json`, assert success and return the `data` payload.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run thesis");
        assert!(
            output.status.success(),
            "thesis {:?} failed: {}{}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        assert_eq!(envelope["schema_version"], "thesis.v1");
        assert_eq!(envelope["status"], "success");
        envelope["data"].clone()
    }

    /// Run with `--json`, assert failure with `code` and return the envelope.
    pub fn json_error(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run thesis");
        assert_eq!(output.status.code(), Some(code), "thesis {:?}", args);
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        assert_eq!(envelope["status"], "error");
        envelope
    }
}
