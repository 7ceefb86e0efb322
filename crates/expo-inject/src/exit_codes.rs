//! Exit codes for the CLI

use expo_inject_core::error::WorkflowError;
use expo_inject_core::ExpoInjectError;

/// Success
pub const SUCCESS: u8 = 0;

/// General error, including a failed git or npm command
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// Git error outside the release chain (discovery, missing remote)
pub const GIT_ERROR: u8 = 3;

/// Validation error
pub const VALIDATION_ERROR: u8 = 5;

/// User cancelled
pub const CANCELLED: u8 = 130;

/// Pick the exit code for a command error
pub fn for_error(err: &anyhow::Error) -> u8 {
    let Some(err) = err.downcast_ref::<ExpoInjectError>() else {
        return ERROR;
    };

    match err {
        ExpoInjectError::Workflow(WorkflowError::Cancelled) => CANCELLED,
        e if e.is_validation() => VALIDATION_ERROR,
        e if e.is_config() => CONFIG_ERROR,
        ExpoInjectError::Git(_) => GIT_ERROR,
        _ => ERROR,
    }
}
