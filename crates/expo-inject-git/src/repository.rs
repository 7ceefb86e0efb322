//! Read-only repository inspection through libgit2

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, StatusOptions};
use tracing::{debug, instrument};

use expo_inject_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Where a release would start from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSummary {
    /// Checked-out branch, `None` when HEAD is unborn or detached
    pub branch: Option<String>,
    /// No staged or unstaged changes to tracked files
    pub clean: bool,
    /// The release remote is configured
    pub remote_present: bool,
}

/// Repository containing the project
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Find the repository containing `start_path`, searching upward
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        let repo = Repository::discover(start_path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::NotARepository(start_path.to_path_buf()),
            _ => GitError::OpenFailed(e.to_string()),
        })?;

        let workdir = match repo.workdir() {
            Some(dir) => dir.to_path_buf(),
            None => return Err(GitError::RepositoryNotFound(repo.path().to_path_buf())),
        };
        debug!(workdir = %workdir.display(), "found git repository");

        Ok(Self { repo, workdir })
    }

    /// Root of the working tree
    pub fn path(&self) -> &Path {
        &self.workdir
    }

    /// Whether a remote called `name` is configured
    pub fn has_remote(&self, name: &str) -> Result<bool> {
        match self.repo.find_remote(name) {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Checked-out branch, `None` when HEAD is unborn or detached
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(head
            .is_branch()
            .then(|| head.shorthand().map(str::to_string))
            .flatten())
    }

    /// Whether tracked files are unmodified; untracked files are ignored
    pub fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    /// Branch, cleanliness and remote presence in one go
    pub fn summary(&self, remote: &str) -> Result<RepoSummary> {
        Ok(RepoSummary {
            branch: self.current_branch()?,
            clean: self.is_clean()?,
            remote_present: self.has_remote(remote)?,
        })
    }
}
