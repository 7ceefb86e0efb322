//! expo-inject git - Git operations for release automation
//!
//! Repository inspection goes through `git2`; commands that need the user's
//! credentials and hooks (fetch, rebase, commit, push) shell out to the git CLI.

mod cli;
mod repository;

pub use cli::GitCli;
pub use repository::{GitRepo, RepoSummary, Result};
