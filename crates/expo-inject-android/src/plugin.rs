//! Plugin props from an Expo `app.json`
//!
//! Expo lists config plugins under `expo.plugins`, either as a bare name or as
//! a `[name, props]` pair. Only pairs whose name is one of ours carry a
//! string resource request.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::request::StringResourceRequest;
use expo_inject_core::error::{ConfigError, Result};

/// Extract requests from a parsed `app.json`
///
/// Accepts both `{ "expo": { "plugins": [...] } }` and a bare
/// `{ "plugins": [...] }` object.
pub fn plugin_requests(
    app_config: &Value,
    plugin_names: &[String],
) -> Result<Vec<StringResourceRequest>> {
    let expo = app_config.get("expo").unwrap_or(app_config);
    let plugins = match expo.get("plugins") {
        Some(Value::Array(plugins)) => plugins,
        Some(_) => {
            return Err(ConfigError::InvalidValue {
                field: "expo.plugins".to_string(),
                message: "expected an array".to_string(),
            }
            .into())
        }
        None => return Ok(Vec::new()),
    };

    let is_ours = |name: &str| plugin_names.iter().any(|n| n == name);
    let mut requests = Vec::new();

    for (index, entry) in plugins.iter().enumerate() {
        match entry {
            Value::Array(pair) => {
                let Some(name) = pair.first().and_then(Value::as_str) else {
                    continue;
                };
                if !is_ours(name) {
                    continue;
                }
                let props = pair.get(1).cloned().unwrap_or(Value::Null);
                let request: StringResourceRequest =
                    serde_json::from_value(props).map_err(|e| ConfigError::InvalidValue {
                        field: format!("expo.plugins[{}]", index),
                        message: e.to_string(),
                    })?;
                debug!(plugin = name, name = %request.name, "found plugin entry");
                requests.push(request);
            }
            Value::String(name) if is_ours(name.as_str()) => {
                return Err(ConfigError::MissingField(format!(
                    "expo.plugins[{}] props (plugin '{}' needs name and value)",
                    index, name
                ))
                .into());
            }
            _ => {}
        }
    }

    Ok(requests)
}

/// Read `app.json` and extract requests
pub fn load_plugin_requests(
    path: &Path,
    plugin_names: &[String],
) -> Result<Vec<StringResourceRequest>> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let app_config: Value =
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: "app.json".to_string(),
            message: e.to_string(),
        })?;
    let requests = plugin_requests(&app_config, plugin_names)?;

    info!(path = %path.display(), count = requests.len(), "loaded plugin requests");
    Ok(requests)
}
