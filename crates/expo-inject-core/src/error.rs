//! Error types for expo-inject

use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::ReleaseStep;

/// Result type alias using ExpoInjectError
pub type Result<T> = std::result::Result<T, ExpoInjectError>;

/// Main error type for expo-inject operations
#[derive(Debug, Error)]
pub enum ExpoInjectError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Resource document errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Adapter-related errors
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Workflow-related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Required executable not found on PATH
    #[error("Required tool '{0}' was not found on PATH")]
    ToolNotFound(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// git CLI invocation could not be spawned or exited unsuccessfully
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Input does not have the MAJOR.MINOR.PATCH[-id.N] shape
    #[error("Invalid version: '{0}' (expected MAJOR.MINOR.PATCH or MAJOR.MINOR.PATCH-<id>.<n>)")]
    InvalidFormat(String),

    /// Entered version does not move forward
    #[error("Invalid version: {new} must be greater than the published version {current}")]
    NotGreater { new: String, current: String },
}

/// Resource document errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// XML could not be read or written
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Document is well-formed XML but not a resource file
    #[error("Invalid resource document: {0}")]
    InvalidStructure(String),

    /// Unknown resource file kind
    #[error("Unsupported resource file '{0}' (supported: strings.xml)")]
    UnsupportedFile(String),

    /// IO error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter-related errors
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Package manifest not found
    #[error("Package manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    /// Failed to parse manifest
    #[error("Failed to parse manifest: {0}")]
    ManifestParseError(String),

    /// Command could not be spawned or exited unsuccessfully
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },
}

/// Workflow-related errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Pre-condition not met
    #[error("Pre-condition not met: {0}")]
    PreConditionFailed(String),

    /// A release step failed; `completed` lists the steps already applied
    #[error("Release step '{step}' failed: {reason}")]
    StepFailed {
        step: ReleaseStep,
        reason: String,
        completed: Vec<ReleaseStep>,
    },

    /// User cancelled
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl ExpoInjectError {
    /// Whether this error comes from operator input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Version(_))
    }

    /// Whether this error is a configuration problem
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Resource(ResourceError::UnsupportedFile(_))
        )
    }
}
