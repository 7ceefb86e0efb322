//! git CLI invocations
//!
//! Each call blocks until git exits. A non-zero exit becomes
//! `GitError::CommandFailed` carrying git's stderr verbatim.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use crate::repository::Result;
use expo_inject_core::error::GitError;

/// Runs git commands inside one working directory
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Create a runner for `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Working directory commands run in
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run `git <args>` and return its trimmed stdout
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.join(" "));
        let start = std::time::Instant::now();
        debug!(command = %command, workdir = %self.workdir.display(), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        info!(
            command = %command,
            duration_ms = start.elapsed().as_millis(),
            success = output.status.success(),
            "git (CLI)"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(GitError::CommandFailed { command, reason });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `git checkout <branch>`
    #[instrument(skip(self))]
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch]).map(drop)
    }

    /// `git fetch <remote>`
    #[instrument(skip(self))]
    pub fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", remote]).map(drop)
    }

    /// `git rebase <upstream>`
    #[instrument(skip(self))]
    pub fn rebase(&self, upstream: &str) -> Result<()> {
        self.run(&["rebase", upstream]).map(drop)
    }

    /// `git add <path>`
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn add(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["add", path.as_ref()]).map(drop)
    }

    /// `git commit -m <message>`
    #[instrument(skip(self))]
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(drop)
    }

    /// `git push` using the branch's configured upstream
    #[instrument(skip(self))]
    pub fn push(&self) -> Result<()> {
        self.run(&["push"]).map(drop)
    }

    /// Create `tag` on `remote` pointing at HEAD, without a local tag
    #[instrument(skip(self))]
    pub fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let refspec = format!("HEAD:refs/tags/{}", tag);
        self.run(&["push", remote, &refspec]).map(drop)
    }
}
