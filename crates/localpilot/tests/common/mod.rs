//! Common test utilities for localpilot integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated home directory so tests never touch the real config
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub project_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let data_dir = temp_dir.path().join(".localpilot");
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(&project_dir)?;

        Ok(Self {
            temp_dir,
            data_dir,
            project_dir,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Command with `HOME` pointed at the test environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_localpilot"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Config whose backend refuses connections
    pub fn create_unreachable_config(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let config = format!(
            r#"{{
  "backend": {{ "base_url": "http://127.0.0.1:1", "model": "test-model" }},
  "agent": {{ "working_dir": "{}" }}
}}"#,
            self.project_dir.display()
        );
        std::fs::write(self.config_file(), config)?;
        Ok(())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
