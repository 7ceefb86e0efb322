//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for expo-inject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release automation settings
    pub release: ReleaseConfig,

    /// String injection settings
    pub inject: InjectConfig,
}

/// Release automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Branch the release is cut from
    pub branch: String,

    /// Remote name
    pub remote: String,

    /// Branch on the remote to rebase onto
    pub base_branch: String,

    /// Tag format (e.g., "v{version}")
    pub tag_format: String,

    /// Commit message template
    pub commit_message: String,

    /// Manifest holding the package version, relative to the project root
    pub version_file: PathBuf,

    /// Package name used in the success banner (defaults to the manifest name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            branch: "feature_release".to_string(),
            remote: "origin".to_string(),
            base_branch: "master".to_string(),
            tag_format: "v{version}".to_string(),
            commit_message: ":bookmark: Release v{version}".to_string(),
            version_file: PathBuf::from("package.json"),
            package_name: None,
        }
    }
}

impl ReleaseConfig {
    /// Remote-tracking ref the release branch is rebased onto
    pub fn upstream(&self) -> String {
        format!("{}/{}", self.remote, self.base_branch)
    }

    /// Render the tag for a version
    pub fn tag_for(&self, version: &str) -> String {
        self.tag_format.replace("{version}", version)
    }

    /// Render the release commit message for a version
    pub fn commit_message_for(&self, version: &str) -> String {
        self.commit_message.replace("{version}", version)
    }
}

/// String injection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    /// Path of the strings resource file, relative to the project root
    pub strings_path: PathBuf,

    /// Plugin names recognised in `app.json` plugin entries
    pub plugin_names: Vec<String>,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            strings_path: PathBuf::from("android/app/src/main/res/values/strings.xml"),
            plugin_names: vec!["expo-inject".to_string(), "./inject.js".to_string()],
        }
    }
}
