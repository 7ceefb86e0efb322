//! Core types for expo-inject

use serde::{Deserialize, Serialize};

/// Result of a release operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResult {
    /// The package name
    pub package: String,
    /// Version that was published before this release
    pub previous_version: Option<String>,
    /// New version
    pub new_version: String,
    /// Tag that was pushed
    pub tag: String,
    /// Whether the package reached the registry
    pub published: bool,
}

impl ReleaseResult {
    /// Create a new release result
    pub fn new(package: impl Into<String>, new_version: impl Into<String>) -> Self {
        let new_version = new_version.into();
        let tag = format!("v{}", new_version);

        Self {
            package: package.into(),
            previous_version: None,
            new_version,
            tag,
            published: false,
        }
    }

    /// Set the previous version
    pub fn with_previous_version(mut self, version: impl Into<String>) -> Self {
        self.previous_version = Some(version.into());
        self
    }

    /// Set the tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set whether published
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    /// Banner printed once the release is complete
    pub fn banner(&self) -> String {
        format!(
            "{} v{} has been successfully released!",
            self.package, self.new_version
        )
    }
}
