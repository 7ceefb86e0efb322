//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_release(config)?;
    validate_inject(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "cannot be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

fn validate_release(config: &Config) -> Result<()> {
    let release = &config.release;
    non_empty("release.branch", &release.branch)?;
    non_empty("release.remote", &release.remote)?;
    non_empty("release.base_branch", &release.base_branch)?;

    if !release.tag_format.contains("{version}") {
        return Err(ConfigError::InvalidValue {
            field: "release.tag_format".to_string(),
            message: "must contain {version} placeholder".to_string(),
        }
        .into());
    }

    if !release.commit_message.contains("{version}") {
        return Err(ConfigError::InvalidValue {
            field: "release.commit_message".to_string(),
            message: "must contain {version} placeholder".to_string(),
        }
        .into());
    }

    if release.version_file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "release.version_file".to_string(),
            message: "cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_inject(config: &Config) -> Result<()> {
    if config.inject.plugin_names.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "inject.plugin_names".to_string(),
            message: "at least one plugin name is required".to_string(),
        }
        .into());
    }

    for (i, name) in config.inject.plugin_names.iter().enumerate() {
        non_empty(&format!("inject.plugin_names[{}]", i), name)?;
    }

    Ok(())
}
