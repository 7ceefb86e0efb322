//! Release command

use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

use clap::Args;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use expo_inject_core::config::{load_config_or_default, ReleaseConfig};
use expo_inject_core::error::{ConfigError, GitError, WorkflowError};
use expo_inject_core::workflow::{
    ReleaseProgress, ReleaseStep, ReleaseToolchain, ReleaseWorkflow, VersionPrompt,
};
use expo_inject_core::{ExpoInjectError, Result};
use expo_inject_git::{GitCli, GitRepo};
use expo_inject_npm::NpmAdapter;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

const REQUIRED_TOOLS: &[&str] = &["git", "npm"];

/// Cut and publish a release
#[derive(Debug, Args)]
pub struct ReleaseCommand {}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing release command");
        let cwd = cli.working_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;

        if config_path.is_none() && cli.chatty() {
            output::warning(&format!(
                "No configuration found, using defaults. Run {} to create one.",
                style("expo-inject init").cyan()
            ));
        }

        preflight(&cwd, &config.release)?;

        let npm = NpmAdapter::new(&cwd);
        let package = match &config.release.package_name {
            Some(name) => name.clone(),
            None => npm.manifest()?.name,
        };

        let toolchain = SystemToolchain {
            git: GitCli::new(&cwd),
            npm,
        };
        let progress = SpinnerProgress::new(!cli.chatty());
        let workflow = ReleaseWorkflow::new(&config.release, &package);

        let result = match workflow.execute(&toolchain, &TerminalPrompt, &progress) {
            Ok(result) => result,
            Err(err) => {
                report_failure(cli, &err);
                return Err(err.into());
            }
        };

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!();
                    output::success(&result.banner());
                }
            }
        }

        Ok(())
    }
}

/// Checks made before any command of the chain runs
fn preflight(cwd: &Path, config: &ReleaseConfig) -> Result<()> {
    for tool in REQUIRED_TOOLS {
        which::which(tool).map_err(|_| ConfigError::ToolNotFound(tool.to_string()))?;
    }

    let repo = GitRepo::discover(cwd)?;
    if !repo.has_remote(&config.remote)? {
        return Err(GitError::RemoteNotFound(config.remote.clone()).into());
    }

    info!(repo = %repo.path().display(), remote = %config.remote, "preflight passed");
    Ok(())
}

/// Tell the operator what already happened before the failure
fn report_failure(cli: &Cli, err: &ExpoInjectError) {
    if !cli.chatty() {
        return;
    }

    if let ExpoInjectError::Workflow(WorkflowError::StepFailed { completed, .. }) = err {
        let applied: Vec<_> = completed
            .iter()
            .filter(|step| step.is_remote())
            .map(ReleaseStep::as_str)
            .collect();
        println!();
        output::error("Release failed. Nothing was rolled back.");
        if !applied.is_empty() {
            output::warning(&format!(
                "Already applied on the remote: {}",
                applied.join(", ")
            ));
        }
    }
}

/// git and npm executables driving the release chain
struct SystemToolchain {
    git: GitCli,
    npm: NpmAdapter,
}

impl ReleaseToolchain for SystemToolchain {
    fn checkout(&self, branch: &str) -> Result<()> {
        Ok(self.git.checkout(branch)?)
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        Ok(self.git.fetch(remote)?)
    }

    fn rebase(&self, upstream: &str) -> Result<()> {
        Ok(self.git.rebase(upstream)?)
    }

    fn published_version(&self) -> Result<String> {
        self.npm.published_version()
    }

    fn bump_version(&self, version: &str) -> Result<()> {
        self.npm.bump_version(version)
    }

    fn stage(&self, path: &Path) -> Result<()> {
        Ok(self.git.add(path)?)
    }

    fn commit(&self, message: &str) -> Result<()> {
        Ok(self.git.commit(message)?)
    }

    fn push(&self) -> Result<()> {
        Ok(self.git.push()?)
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        Ok(self.git.push_tag(remote, tag)?)
    }

    fn publish(&self) -> Result<()> {
        self.npm.publish()
    }
}

/// Reads the version from the terminal
struct TerminalPrompt;

impl VersionPrompt for TerminalPrompt {
    fn ask_version(&self, current: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt_text(current))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| {
                warn!(error = %e, "version prompt aborted");
                WorkflowError::Cancelled.into()
            })
    }
}

fn prompt_text(current: &str) -> String {
    format!("Enter new version: (current version: {})", current)
}

/// One spinner per step; the prompt step runs without one
struct SpinnerProgress {
    quiet: bool,
    current: RefCell<Option<ProgressBar>>,
}

impl SpinnerProgress {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            current: RefCell::new(None),
        }
    }

    fn clear(&self) {
        if let Some(bar) = self.current.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}

impl ReleaseProgress for SpinnerProgress {
    fn step_started(&self, step: ReleaseStep) {
        if self.quiet || step == ReleaseStep::PromptNewVersion {
            return;
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(step.as_str());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.current.borrow_mut() = Some(bar);
    }

    fn step_finished(&self, step: ReleaseStep) {
        self.clear();
        if !self.quiet && step != ReleaseStep::PromptNewVersion {
            output::success(step.as_str());
        }
    }

    fn step_failed(&self, step: ReleaseStep, _error: &ExpoInjectError) {
        self.clear();
        if !self.quiet {
            output::error(step.as_str());
        }
    }
}
