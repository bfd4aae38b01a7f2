#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Throwaway data directory for one test
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("write config");
        path
    }

    /// `ct` bound to this data directory, isolated from the environment
    pub fn ct(&self) -> Command {
        let mut cmd = ct_cmd();
        cmd.env("CT_DATA_DIR", self.dir.path());
        cmd
    }

    /// Run `ct <args> --json` and return the `data` field of the envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .ct()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }
}

pub fn ct_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ct").expect("binary");
    cmd.env_remove("CT_DATA_DIR")
        .env_remove("CT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}
