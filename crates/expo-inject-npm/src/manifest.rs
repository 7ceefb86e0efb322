//! npm package.json handling

use std::collections::HashMap;
use std::path::Path;

use expo_inject_core::error::{AdapterError, Result};
use serde::{Deserialize, Serialize};

/// The parts of package.json the release flow reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Package description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Main entry point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Whether package is private
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,

    /// Preserve other fields
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

impl PackageJson {
    /// Load package.json from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

        serde_json::from_str(&content)
            .map_err(|e| AdapterError::ManifestParseError(e.to_string()).into())
    }

    /// Whether the manifest marks the package private (npm refuses to publish it)
    pub fn is_private(&self) -> bool {
        self.private.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(&path, r#"{"name": "test", "version": "1.0.0"}"#).unwrap();

        let pkg = PackageJson::load(&path).unwrap();
        assert_eq!(pkg.name, "test");
        assert_eq!(pkg.version, "1.0.0");
        assert!(!pkg.is_private());
    }

    #[test]
    fn test_load_keeps_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(
            &path,
            r#"{
                "name": "expo-inject",
                "version": "1.0.1",
                "main": "build/index.js",
                "private": true,
                "peerDependencies": {"expo": "*"}
            }"#,
        )
        .unwrap();

        let pkg = PackageJson::load(&path).unwrap();
        assert_eq!(pkg.main.as_deref(), Some("build/index.js"));
        assert!(pkg.is_private());
        assert!(pkg.other.contains_key("peerDependencies"));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(PackageJson::load(&path).is_err());
    }
}
