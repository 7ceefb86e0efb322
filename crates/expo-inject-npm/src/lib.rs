//! expo-inject npm - npm package handling for release automation
//!
//! Reads `package.json` and drives the npm CLI for the registry-facing release
//! steps (show, version, publish).

mod manifest;

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use expo_inject_core::error::{AdapterError, Result};

pub use manifest::PackageJson;

/// npm package adapter rooted at one package directory
#[derive(Debug, Clone)]
pub struct NpmAdapter {
    path: PathBuf,
}

impl NpmAdapter {
    /// Create an adapter for the package in `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Package directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the package.json path
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("package.json")
    }

    /// Check if a package.json exists
    pub fn detect(&self) -> bool {
        self.manifest_path().exists()
    }

    /// Load the package manifest
    pub fn manifest(&self) -> Result<PackageJson> {
        PackageJson::load(&self.manifest_path())
    }

    /// Run `npm <args>` in the package directory and return trimmed stdout
    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("npm {}", args.join(" "));
        let start = std::time::Instant::now();
        debug!(command = %command, path = %self.path.display(), "running npm");

        let output = Command::new("npm")
            .args(args)
            .current_dir(&self.path)
            .output()
            .map_err(|e| AdapterError::CommandFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        info!(
            command = %command,
            duration_ms = start.elapsed().as_millis(),
            success = output.status.success(),
            "npm (CLI)"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(AdapterError::CommandFailed { command, reason }.into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Version currently published to the registry (`npm show . version`)
    #[instrument(skip(self))]
    pub fn published_version(&self) -> Result<String> {
        self.run(&["show", ".", "version"])
    }

    /// Write `version` into package.json without creating a git tag
    #[instrument(skip(self))]
    pub fn bump_version(&self, version: &str) -> Result<()> {
        self.run(&["version", version, "--no-git-tag-version"])
            .map(drop)
    }

    /// Publish the package (`npm publish`)
    #[instrument(skip(self))]
    pub fn publish(&self) -> Result<()> {
        self.run(&["publish"]).map(drop)
    }
}
