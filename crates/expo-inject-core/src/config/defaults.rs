//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "expo-inject.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "expo-inject.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".expo-inject.toml",
        ".expo-inject.yaml",
    ]
}

/// Default configuration template written by `expo-inject init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# expo-inject configuration

[release]
branch = "feature_release"
remote = "origin"
base_branch = "master"
tag_format = "v{version}"
commit_message = ":bookmark: Release v{version}"
version_file = "package.json"
# package_name = "my-package"

[inject]
strings_path = "android/app/src/main/res/values/strings.xml"
plugin_names = ["expo-inject", "./inject.js"]
"#;
