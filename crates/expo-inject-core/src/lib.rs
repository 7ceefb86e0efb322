//! expo-inject core
//!
//! Shared error types, configuration loading, and the release workflow state
//! machine used by the `expo-inject` CLI.

pub mod config;
pub mod error;
pub mod types;
pub mod workflow;

pub use error::{ExpoInjectError, Result};
pub use types::ReleaseResult;
