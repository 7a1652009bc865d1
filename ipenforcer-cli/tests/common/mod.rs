//! Common test utilities for CLI integration tests.
//!
//! This module provides an isolated test environment: a temporary working
//! directory, configuration file helpers, and a command builder that never
//! inherits `IPENFORCER_*` settings from the surrounding shell.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables the binary reads.
const IPENFORCER_VARS: &[&str] = &[
    "IPENFORCER_CONFIG",
    "IPENFORCER_HOST_PROJECT",
    "IPENFORCER_OUTPUT_FORMAT",
    "IPENFORCER_LOG_MODE",
    "IPENFORCER_DRY_RUN",
    "IPENFORCER_MAX_PARALLEL_PROJECTS",
    "IPENFORCER_OPERATION_TIMEOUT_SECONDS",
    "IPENFORCER_RUN_DEADLINE_SECONDS",
];

/// A configuration with one folder profile and one fixed-list profile.
#[allow(dead_code)]
pub const SAMPLE_CONFIG: &str = r#"hosts:
  acme-host:
    folder_id: "464555476602"
  acme-shared-vpc:
    projects:
      - acme-web
      - acme-api
enforcement:
  max_parallel_projects: 2
"#;

/// Test environment with an isolated working directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a command builder running in the temporary directory.
    ///
    /// `IPENFORCER_*` variables are cleared and a static access token is
    /// set, so no command ever queries the metadata server for credentials.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ipenforcer").expect("Failed to find ipenforcer binary");
        cmd.current_dir(&self.temp_path);
        for var in IPENFORCER_VARS {
            cmd.env_remove(var);
        }
        cmd.env("IPENFORCER_ACCESS_TOKEN", "test-token");
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file into the test environment and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write `ipenforcer.yaml` into the working directory.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write_file("ipenforcer.yaml", contents)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
