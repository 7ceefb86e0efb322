//! Release workflow state machine
//!
//! A release is a fixed, linear chain of steps. Each step runs one external
//! command (or the version prompt) and the chain advances only when that step
//! succeeds. The first failure ends the run: nothing is retried and nothing
//! already applied is rolled back. The error carries the list of completed
//! steps so the caller can report how far the repository and registry moved.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ReleaseConfig;
use crate::error::{ExpoInjectError, Result, WorkflowError};
use crate::types::ReleaseResult;

use super::version::{ensure_version_increases, validate_version};

/// One state of the release chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStep {
    CheckoutBranch,
    FetchOrigin,
    RebaseOntoMaster,
    ReadPublishedVersion,
    PromptNewVersion,
    ValidateVersion,
    BumpVersionFile,
    StageChanges,
    CommitChanges,
    PushCommits,
    PushTag,
    PublishPackage,
    Done,
}

impl ReleaseStep {
    /// Every state in execution order
    pub fn all() -> &'static [ReleaseStep] {
        &[
            Self::CheckoutBranch,
            Self::FetchOrigin,
            Self::RebaseOntoMaster,
            Self::ReadPublishedVersion,
            Self::PromptNewVersion,
            Self::ValidateVersion,
            Self::BumpVersionFile,
            Self::StageChanges,
            Self::CommitChanges,
            Self::PushCommits,
            Self::PushTag,
            Self::PublishPackage,
            Self::Done,
        ]
    }

    /// Human-readable step name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutBranch => "checkout branch",
            Self::FetchOrigin => "fetch origin",
            Self::RebaseOntoMaster => "rebase onto master",
            Self::ReadPublishedVersion => "read published version",
            Self::PromptNewVersion => "prompt new version",
            Self::ValidateVersion => "validate version",
            Self::BumpVersionFile => "bump version file",
            Self::StageChanges => "stage changes",
            Self::CommitChanges => "commit changes",
            Self::PushCommits => "push commits",
            Self::PushTag => "push tag",
            Self::PublishPackage => "publish package",
            Self::Done => "done",
        }
    }

    /// The state that follows this one, `None` for `Done`
    pub fn next(&self) -> Option<ReleaseStep> {
        let all = Self::all();
        let index = all.iter().position(|s| s == self)?;
        all.get(index + 1).copied()
    }

    /// Whether completing this step changes the repository or the registry
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::CheckoutBranch
                | Self::RebaseOntoMaster
                | Self::BumpVersionFile
                | Self::StageChanges
                | Self::CommitChanges
                | Self::PushCommits
                | Self::PushTag
                | Self::PublishPackage
        )
    }

    /// Whether completing this step is visible outside the local checkout
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::PushCommits | Self::PushTag | Self::PublishPackage
        )
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External commands driven by the release chain, one method per command step
pub trait ReleaseToolchain {
    /// Switch to the release branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Fetch from the remote
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Rebase the current branch onto `upstream` (e.g. `origin/master`)
    fn rebase(&self, upstream: &str) -> Result<()>;

    /// Version currently published to the registry
    fn published_version(&self) -> Result<String>;

    /// Write `version` into the package manifest without tagging
    fn bump_version(&self, version: &str) -> Result<()>;

    /// Stage a file for commit
    fn stage(&self, path: &Path) -> Result<()>;

    /// Commit staged changes
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the current branch
    fn push(&self) -> Result<()>;

    /// Create `tag` on the remote at the current commit
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Publish the package to the registry
    fn publish(&self) -> Result<()>;
}

/// Source of the operator-entered version
pub trait VersionPrompt {
    /// Ask for the new version, showing the published one
    fn ask_version(&self, current: &str) -> Result<String>;
}

/// Observer for step transitions
pub trait ReleaseProgress {
    fn step_started(&self, _step: ReleaseStep) {}

    fn step_finished(&self, _step: ReleaseStep) {}

    fn step_failed(&self, _step: ReleaseStep, _error: &ExpoInjectError) {}
}

/// Progress observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ReleaseProgress for NoProgress {}

/// Transient, process-local state of one run
#[derive(Debug)]
struct ReleaseState {
    step: ReleaseStep,
    published_version: Option<String>,
    entered_version: Option<String>,
    target_version: Option<String>,
    completed: Vec<ReleaseStep>,
}

impl ReleaseState {
    fn new() -> Self {
        Self {
            step: ReleaseStep::CheckoutBranch,
            published_version: None,
            entered_version: None,
            target_version: None,
            completed: Vec::new(),
        }
    }

    fn advance(&mut self) {
        self.completed.push(self.step);
        self.step = self.step.next().unwrap_or(ReleaseStep::Done);
    }

    fn published(&self) -> &str {
        self.published_version.as_deref().unwrap_or_default()
    }

    fn target(&self) -> Result<&str> {
        self.target_version.as_deref().ok_or_else(|| {
            WorkflowError::PreConditionFailed("no validated version available".to_string()).into()
        })
    }
}

/// Execute the release chain
pub struct ReleaseWorkflow<'a> {
    config: &'a ReleaseConfig,
    package: String,
}

impl<'a> ReleaseWorkflow<'a> {
    /// Create a new release workflow for `package`
    pub fn new(config: &'a ReleaseConfig, package: impl Into<String>) -> Self {
        Self {
            config,
            package: package.into(),
        }
    }

    /// Run every step in order until `Done` or the first failure
    pub fn execute(
        &self,
        toolchain: &dyn ReleaseToolchain,
        prompt: &dyn VersionPrompt,
        progress: &dyn ReleaseProgress,
    ) -> Result<ReleaseResult> {
        info!(
            package = %self.package,
            branch = %self.config.branch,
            upstream = %self.config.upstream(),
            "executing release workflow"
        );

        let mut state = ReleaseState::new();

        while state.step != ReleaseStep::Done {
            let step = state.step;
            debug!(step = %step, "starting release step");
            progress.step_started(step);

            if let Err(error) = self.run_step(step, &mut state, toolchain, prompt) {
                progress.step_failed(step, &error);
                return Err(Self::fail(step, error, &state));
            }

            progress.step_finished(step);
            state.advance();
        }

        let version = state.target()?.to_string();
        let mut result = ReleaseResult::new(&self.package, &version)
            .with_tag(self.config.tag_for(&version))
            .with_published(true);
        if let Some(previous) = &state.published_version {
            result = result.with_previous_version(previous.trim());
        }

        info!(package = %result.package, version = %result.new_version, "release complete");
        Ok(result)
    }

    fn run_step(
        &self,
        step: ReleaseStep,
        state: &mut ReleaseState,
        toolchain: &dyn ReleaseToolchain,
        prompt: &dyn VersionPrompt,
    ) -> Result<()> {
        match step {
            ReleaseStep::CheckoutBranch => toolchain.checkout(&self.config.branch),
            ReleaseStep::FetchOrigin => toolchain.fetch(&self.config.remote),
            ReleaseStep::RebaseOntoMaster => toolchain.rebase(&self.config.upstream()),
            ReleaseStep::ReadPublishedVersion => {
                let version = toolchain.published_version()?;
                info!(version = %version.trim(), "published version");
                state.published_version = Some(version.trim().to_string());
                Ok(())
            }
            ReleaseStep::PromptNewVersion => {
                let entered = prompt.ask_version(state.published())?;
                state.entered_version = Some(entered);
                Ok(())
            }
            ReleaseStep::ValidateVersion => {
                let entered = state.entered_version.as_deref().unwrap_or_default();
                let version = validate_version(entered)?;
                ensure_version_increases(&version, state.published())?;
                state.target_version = Some(version);
                Ok(())
            }
            ReleaseStep::BumpVersionFile => toolchain.bump_version(state.target()?),
            ReleaseStep::StageChanges => toolchain.stage(&self.config.version_file),
            ReleaseStep::CommitChanges => {
                let message = self.config.commit_message_for(state.target()?);
                toolchain.commit(&message)
            }
            ReleaseStep::PushCommits => toolchain.push(),
            ReleaseStep::PushTag => {
                let tag = self.config.tag_for(state.target()?);
                toolchain.push_tag(&self.config.remote, &tag)
            }
            ReleaseStep::PublishPackage => toolchain.publish(),
            ReleaseStep::Done => Ok(()),
        }
    }

    /// Map a step error to the run's terminal error.
    ///
    /// Validation errors and cancellation keep their own kind; everything else
    /// becomes a `StepFailed` naming the step and the steps already applied.
    fn fail(step: ReleaseStep, error: ExpoInjectError, state: &ReleaseState) -> ExpoInjectError {
        match error {
            ExpoInjectError::Version(_) | ExpoInjectError::Workflow(WorkflowError::Cancelled) => {
                warn!(step = %step, error = %error, "release stopped");
                error
            }
            other => {
                let remote: Vec<_> = state.completed.iter().filter(|s| s.is_remote()).collect();
                warn!(
                    step = %step,
                    error = %other,
                    completed = state.completed.len(),
                    remote_steps_applied = remote.len(),
                    "release step failed"
                );
                WorkflowError::StepFailed {
                    step,
                    reason: other.to_string(),
                    completed: state.completed.clone(),
                }
                .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdapterError, VersionError};
    use std::cell::{Cell, RefCell};

    /// Records every command and fails the one mapped to `fail_on`
    struct ScriptedToolchain {
        calls: RefCell<Vec<String>>,
        fail_on: Option<ReleaseStep>,
        published: String,
    }

    impl ScriptedToolchain {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on: None,
                published: "1.0.0\n".to_string(),
            }
        }

        fn failing_at(step: ReleaseStep) -> Self {
            Self {
                fail_on: Some(step),
                ..Self::new()
            }
        }

        fn run(&self, step: ReleaseStep, command: String) -> Result<()> {
            self.calls.borrow_mut().push(command.clone());
            if self.fail_on == Some(step) {
                return Err(AdapterError::CommandFailed {
                    command,
                    reason: "exit status 1".to_string(),
                }
                .into());
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ReleaseToolchain for ScriptedToolchain {
        fn checkout(&self, branch: &str) -> Result<()> {
            self.run(ReleaseStep::CheckoutBranch, format!("git checkout {}", branch))
        }

        fn fetch(&self, remote: &str) -> Result<()> {
            self.run(ReleaseStep::FetchOrigin, format!("git fetch {}", remote))
        }

        fn rebase(&self, upstream: &str) -> Result<()> {
            self.run(ReleaseStep::RebaseOntoMaster, format!("git rebase {}", upstream))
        }

        fn published_version(&self) -> Result<String> {
            self.run(ReleaseStep::ReadPublishedVersion, "npm show . version".to_string())?;
            Ok(self.published.clone())
        }

        fn bump_version(&self, version: &str) -> Result<()> {
            self.run(
                ReleaseStep::BumpVersionFile,
                format!("npm version {} --no-git-tag-version", version),
            )
        }

        fn stage(&self, path: &Path) -> Result<()> {
            self.run(ReleaseStep::StageChanges, format!("git add {}", path.display()))
        }

        fn commit(&self, message: &str) -> Result<()> {
            self.run(ReleaseStep::CommitChanges, format!("git commit -m {}", message))
        }

        fn push(&self) -> Result<()> {
            self.run(ReleaseStep::PushCommits, "git push".to_string())
        }

        fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
            self.run(ReleaseStep::PushTag, format!("git push {} {}", remote, tag))
        }

        fn publish(&self) -> Result<()> {
            self.run(ReleaseStep::PublishPackage, "npm publish".to_string())
        }
    }

    struct FixedPrompt {
        answer: String,
        asked_with: RefCell<Option<String>>,
    }

    impl FixedPrompt {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                asked_with: RefCell::new(None),
            }
        }

        fn was_asked(&self) -> bool {
            self.asked_with.borrow().is_some()
        }
    }

    impl VersionPrompt for FixedPrompt {
        fn ask_version(&self, current: &str) -> Result<String> {
            *self.asked_with.borrow_mut() = Some(current.to_string());
            Ok(self.answer.clone())
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        started: Cell<usize>,
        finished: Cell<usize>,
        failed: RefCell<Option<ReleaseStep>>,
    }

    impl ReleaseProgress for CountingProgress {
        fn step_started(&self, _step: ReleaseStep) {
            self.started.set(self.started.get() + 1);
        }

        fn step_finished(&self, _step: ReleaseStep) {
            self.finished.set(self.finished.get() + 1);
        }

        fn step_failed(&self, step: ReleaseStep, _error: &ExpoInjectError) {
            *self.failed.borrow_mut() = Some(step);
        }
    }

    fn step_failure(err: ExpoInjectError) -> (ReleaseStep, String, Vec<ReleaseStep>) {
        match err {
            ExpoInjectError::Workflow(WorkflowError::StepFailed {
                step,
                reason,
                completed,
            }) => (step, reason, completed),
            other => panic!("expected StepFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_step_order() {
        let mut step = ReleaseStep::CheckoutBranch;
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            visited.push(next);
            step = next;
        }
        assert_eq!(visited, ReleaseStep::all());
        assert_eq!(ReleaseStep::Done.next(), None);
    }

    #[test]
    fn test_successful_release_runs_every_command_in_order() {
        let config = ReleaseConfig::default();
        let toolchain = ScriptedToolchain::new();
        let prompt = FixedPrompt::new("1.0.1");
        let progress = CountingProgress::default();

        let result = ReleaseWorkflow::new(&config, "expo-inject")
            .execute(&toolchain, &prompt, &progress)
            .unwrap();

        assert_eq!(
            toolchain.calls(),
            vec![
                "git checkout feature_release",
                "git fetch origin",
                "git rebase origin/master",
                "npm show . version",
                "npm version 1.0.1 --no-git-tag-version",
                "git add package.json",
                "git commit -m :bookmark: Release v1.0.1",
                "git push",
                "git push origin v1.0.1",
                "npm publish",
            ]
        );
        assert_eq!(prompt.asked_with.borrow().as_deref(), Some("1.0.0"));
        assert_eq!(result.new_version, "1.0.1");
        assert_eq!(result.previous_version.as_deref(), Some("1.0.0"));
        assert_eq!(result.tag, "v1.0.1");
        assert!(result.published);
        assert_eq!(
            result.banner(),
            "expo-inject v1.0.1 has been successfully released!"
        );

        // Done is never started
        assert_eq!(progress.started.get(), ReleaseStep::all().len() - 1);
        assert_eq!(progress.finished.get(), progress.started.get());
    }

    #[test]
    fn test_fetch_failure_stops_before_rebase_and_prompt() {
        let config = ReleaseConfig::default();
        let toolchain = ScriptedToolchain::failing_at(ReleaseStep::FetchOrigin);
        let prompt = FixedPrompt::new("1.0.1");
        let progress = CountingProgress::default();

        let err = ReleaseWorkflow::new(&config, "expo-inject")
            .execute(&toolchain, &prompt, &progress)
            .unwrap_err();

        assert!(err.to_string().contains("fetch origin"));
        let (step, reason, completed) = step_failure(err);
        assert_eq!(step, ReleaseStep::FetchOrigin);
        assert!(reason.contains("git fetch origin"));
        assert_eq!(completed, vec![ReleaseStep::CheckoutBranch]);

        assert_eq!(
            toolchain.calls(),
            vec!["git checkout feature_release", "git fetch origin"]
        );
        assert!(!prompt.was_asked());
        assert_eq!(*progress.failed.borrow(), Some(ReleaseStep::FetchOrigin));
    }

    #[test]
    fn test_publish_failure_leaves_pushes_applied() {
        let config = ReleaseConfig::default();
        let toolchain = ScriptedToolchain::failing_at(ReleaseStep::PublishPackage);
        let prompt = FixedPrompt::new("1.1.0");

        let err = ReleaseWorkflow::new(&config, "expo-inject")
            .execute(&toolchain, &prompt, &NoProgress)
            .unwrap_err();

        let (step, reason, completed) = step_failure(err);
        assert_eq!(step, ReleaseStep::PublishPackage);
        assert!(reason.contains("npm publish"));

        // No rollback: the pushes already happened and stay applied
        assert!(completed.contains(&ReleaseStep::PushCommits));
        assert!(completed.contains(&ReleaseStep::PushTag));
        assert!(!completed.contains(&ReleaseStep::PublishPackage));
        let calls = toolchain.calls();
        assert!(calls.contains(&"git push".to_string()));
        assert!(calls.contains(&"git push origin v1.1.0".to_string()));
        assert_eq!(calls.last().map(String::as_str), Some("npm publish"));
    }

    #[test]
    fn test_invalid_version_runs_no_mutating_command() {
        let config = ReleaseConfig::default();
        let toolchain = ScriptedToolchain::new();
        let prompt = FixedPrompt::new("v1.2.3");

        let err = ReleaseWorkflow::new(&config, "expo-inject")
            .execute(&toolchain, &prompt, &NoProgress)
            .unwrap_err();

        assert!(matches!(
            err,
            ExpoInjectError::Version(VersionError::InvalidFormat(_))
        ));
        assert!(err.is_validation());
        assert_eq!(toolchain.calls().len(), 4);
        assert!(!toolchain.calls().iter().any(|c| c.starts_with("npm version")));
    }

    #[test]
    fn test_version_not_greater_than_published() {
        let config = ReleaseConfig::default();
        let toolchain = ScriptedToolchain::new();
        let prompt = FixedPrompt::new("1.0.0");

        let err = ReleaseWorkflow::new(&config, "expo-inject")
            .execute(&toolchain, &prompt, &NoProgress)
            .unwrap_err();

        assert!(matches!(
            err,
            ExpoInjectError::Version(VersionError::NotGreater { .. })
        ));
    }

    #[test]
    fn test_cancelled_prompt_is_not_wrapped() {
        struct CancelPrompt;
        impl VersionPrompt for CancelPrompt {
            fn ask_version(&self, _current: &str) -> Result<String> {
                Err(WorkflowError::Cancelled.into())
            }
        }

        let config = ReleaseConfig::default();
        let toolchain = ScriptedToolchain::new();
        let err = ReleaseWorkflow::new(&config, "expo-inject")
            .execute(&toolchain, &CancelPrompt, &NoProgress)
            .unwrap_err();

        assert!(matches!(
            err,
            ExpoInjectError::Workflow(WorkflowError::Cancelled)
        ));
    }

    #[test]
    fn test_custom_config_drives_commands() {
        let config = ReleaseConfig {
            branch: "release".to_string(),
            remote: "upstream".to_string(),
            base_branch: "main".to_string(),
            tag_format: "release-{version}".to_string(),
            commit_message: "chore: release {version}".to_string(),
            ..ReleaseConfig::default()
        };
        let toolchain = ScriptedToolchain::new();
        let prompt = FixedPrompt::new("2.0.0-beta.1");

        let result = ReleaseWorkflow::new(&config, "pkg")
            .execute(&toolchain, &prompt, &NoProgress)
            .unwrap();

        let calls = toolchain.calls();
        assert_eq!(calls[0], "git checkout release");
        assert_eq!(calls[2], "git rebase upstream/main");
        assert!(calls.contains(&"git commit -m chore: release 2.0.0-beta.1".to_string()));
        assert!(calls.contains(&"git push upstream release-2.0.0-beta.1".to_string()));
        assert_eq!(result.tag, "release-2.0.0-beta.1");
    }
}
