//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Serialization format of a config file, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    fn parse(self, content: &str) -> Result<Config> {
        let config = match self {
            Self::Toml => toml::from_str(content).map_err(ConfigError::TomlError)?,
            Self::Yaml => serde_yaml::from_str(content).map_err(ConfigError::YamlError)?,
        };
        Ok(config)
    }
}

/// Read, parse and validate a config file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = ConfigFormat::from_path(path);
    info!(path = %path.display(), ?format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = format.parse(&content)?;

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Search `start_dir` and its ancestors for a config file.
///
/// At each level every name is tried in the directory itself and then in its
/// `.github/` folder, so `expo-inject.toml` beats `.github/expo-inject.toml`
/// which beats `expo-inject.yaml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");

    let found = start_dir.ancestors().find_map(|dir| {
        config_file_names()
            .into_iter()
            .flat_map(|name| [dir.join(name), dir.join(".github").join(name)])
            .find(|candidate| candidate.is_file())
    });

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!("no config file found"),
    }
    found
}

/// Load configuration, falling back to defaults only when no file exists.
///
/// A config file that exists but fails to parse or validate is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("expo-inject.toml");
        std::fs::write(&config_path, "[release]\nbranch = \"release\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("expo-inject.toml");
        let yaml_path = temp.path().join("expo-inject.yaml");
        std::fs::write(&toml_path, "[release]\nbranch = \"release\"").unwrap();
        std::fs::write(&yaml_path, "release:\n  branch: release").unwrap();

        let found = find_config(temp.path()).unwrap();
        assert_eq!(found, toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("expo-inject.toml");
        std::fs::write(&config_path, "[release]\nbranch = \"release\"").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("expo-inject.toml");
        std::fs::write(&config_path, "").unwrap();
        let nested = temp.path().join("android").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("expo-inject.yaml");
        std::fs::write(
            &config_path,
            "release:\n  remote: upstream\ninject:\n  plugin_names: [\"my-plugin\"]\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.release.remote, "upstream");
        assert_eq!(config.release.branch, "feature_release");
        assert_eq!(config.inject.plugin_names, vec!["my-plugin".to_string()]);
    }

    #[test]
    fn test_nearest_directory_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("expo-inject.toml"), "").unwrap();
        let app = temp.path().join("app");
        std::fs::create_dir_all(&app).unwrap();
        let nearest = app.join(".expo-inject.yaml");
        std::fs::write(&nearest, "release:\n  branch: next\n").unwrap();

        assert_eq!(find_config(&app), Some(nearest.clone()));
        assert_eq!(load_config(&nearest).unwrap().release.branch, "next");
    }

    #[test]
    fn test_load_invalid_config_is_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("expo-inject.toml"),
            "[release]\ntag_format = \"release\"\n",
        )
        .unwrap();

        assert!(load_config_or_default(temp.path()).is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config.release.remote, "origin");
    }
}
