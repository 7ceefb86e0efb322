//! String resource requests

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::xml::Element;
use expo_inject_core::error::{ConfigError, ResourceError, Result};

/// Resource file a request targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceFile {
    /// `res/values/strings.xml`
    #[default]
    Strings,
}

impl ResourceFile {
    /// File name under `res/values/`
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Strings => "strings.xml",
        }
    }
}

impl fmt::Display for ResourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for ResourceFile {
    type Err = ResourceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "strings.xml" | "string.xml" => Ok(Self::Strings),
            other => Err(ResourceError::UnsupportedFile(other.to_string())),
        }
    }
}

impl TryFrom<String> for ResourceFile {
    type Error = ResourceError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceFile> for String {
    fn from(file: ResourceFile) -> Self {
        file.file_name().to_string()
    }
}

/// One `<string>` entry to upsert
///
/// Deserializes from Expo plugin props:
///
/// ```json
/// { "file": "strings.xml", "name": "api_key", "value": "abc", "translatable": false }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringResourceRequest {
    #[serde(default)]
    pub file: ResourceFile,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: String,

    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub translatable: Option<String>,

    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_api: Option<String>,
}

impl StringResourceRequest {
    /// Request for `name` = `value` in `strings.xml`
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_translatable(mut self, translatable: impl Into<String>) -> Self {
        self.translatable = Some(translatable.into());
        self
    }

    pub fn with_target_api(mut self, target_api: impl Into<String>) -> Self {
        self.target_api = Some(target_api.into());
        self
    }

    pub fn with_file(mut self, file: ResourceFile) -> Self {
        self.file = file;
        self
    }

    /// Validate the request, treating empty optional attributes as absent
    pub fn normalized(&self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name".to_string()).into());
        }
        if self.value.is_empty() {
            return Err(ConfigError::MissingField("value".to_string()).into());
        }

        let translatable = non_empty(&self.translatable);
        if let Some(t) = &translatable {
            if t != "true" && t != "false" {
                return Err(ConfigError::InvalidValue {
                    field: "translatable".to_string(),
                    message: format!("expected \"true\" or \"false\", got \"{}\"", t),
                }
                .into());
            }
        }

        Ok(Self {
            file: self.file,
            name: self.name.clone(),
            value: self.value.clone(),
            translatable,
            target_api: non_empty(&self.target_api),
        })
    }

    /// The `<string>` element this request writes
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("string").with_attribute("name", self.name.as_str());
        if let Some(t) = non_empty(&self.translatable) {
            element.set_attribute("translatable", t);
        }
        if let Some(api) = non_empty(&self.target_api) {
            element.set_attribute("tools:targetApi", api);
        }
        element.with_text(self.value.as_str())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Plugin props carry these as strings, booleans or numbers
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        String(String),
        Bool(bool),
        Number(serde_json::Number),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::String(s) => s,
        Scalar::Bool(b) => b.to_string(),
        Scalar::Number(n) => n.to_string(),
    }))
}
