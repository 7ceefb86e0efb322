//! Status command

use clap::Args;
use console::style;
use tracing::{debug, info};

use expo_inject_android::ResourceDocument;
use expo_inject_core::config::load_config_or_default;
use expo_inject_core::ExpoInjectError;
use expo_inject_git::GitRepo;
use expo_inject_npm::NpmAdapter;

use crate::cli::output::{self, header, key_value};
use crate::cli::{Cli, OutputFormat};

/// Show configuration, repository and resource status
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing status command");
        let cwd = cli.working_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;

        // A missing repository or manifest is reported, not fatal
        let repo = match GitRepo::discover(&cwd) {
            Ok(repo) => Some(repo),
            Err(e) => {
                debug!(error = %e, "no git repository");
                None
            }
        };
        let summary = match &repo {
            Some(repo) => Some(
                repo.summary(&config.release.remote)
                    .map_err(ExpoInjectError::from)?,
            ),
            None => None,
        };

        let npm = NpmAdapter::new(&cwd);
        let manifest = if npm.detect() {
            Some(npm.manifest()?)
        } else {
            None
        };

        let strings_path = cwd.join(&config.inject.strings_path);
        let string_count = if strings_path.exists() {
            Some(ResourceDocument::load(&strings_path)?.strings().count())
        } else {
            None
        };

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "config_found": config_path.is_some(),
                    "config_path": config_path.as_ref().map(|p| p.to_string_lossy().to_string()),
                    "release": {
                        "branch": config.release.branch,
                        "upstream": config.release.upstream(),
                        "remote_present": summary.as_ref().is_some_and(|s| s.remote_present),
                    },
                    "git": {
                        "repository": repo.as_ref().map(|r| r.path().to_string_lossy().to_string()),
                        "branch": summary.as_ref().and_then(|s| s.branch.clone()),
                        "clean": summary.as_ref().map(|s| s.clean),
                    },
                    "package": manifest.as_ref().map(|m| serde_json::json!({
                        "name": m.name,
                        "version": m.version,
                        "private": m.is_private(),
                    })),
                    "strings": {
                        "path": strings_path.to_string_lossy(),
                        "exists": string_count.is_some(),
                        "entries": string_count,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", style("expo-inject status").bold());
                println!();

                println!("{}", header("Configuration"));
                match &config_path {
                    Some(path) => {
                        let path = output::path_style().apply_to(path.display());
                        println!("{}", key_value("Config file", &path.to_string()));
                    }
                    None => {
                        let missing = format!("{} (using defaults)", style("not found").yellow());
                        println!("{}", key_value("Config file", &missing));
                    }
                }
                println!("{}", key_value("Release branch", &config.release.branch));
                println!("{}", key_value("Upstream", &config.release.upstream()));
                println!();

                println!("{}", header("Git"));
                if let Some(summary) = &summary {
                    let branch = match &summary.branch {
                        Some(b) if *b == config.release.branch => style(b.as_str()).green(),
                        Some(b) => style(b.as_str()).yellow(),
                        None => style("detached").dim(),
                    };
                    println!("{}", key_value("Branch", &branch.to_string()));
                    let clean = if summary.clean {
                        style("clean").green()
                    } else {
                        style("dirty").red()
                    };
                    println!("{}", key_value("Status", &clean.to_string()));
                    let remote = if summary.remote_present {
                        style(config.release.remote.as_str()).green()
                    } else {
                        style(config.release.remote.as_str()).red()
                    };
                    println!("{}", key_value("Remote", &remote.to_string()));
                } else {
                    let missing = style("not found").red().to_string();
                    println!("{}", key_value("Repository", &missing));
                }
                println!();

                println!("{}", header("Package"));
                match &manifest {
                    Some(m) => {
                        println!("{}", key_value("Name", &m.name));
                        let version = output::version_style().apply_to(&m.version);
                        println!("{}", key_value("Version", &version.to_string()));
                        if m.is_private() {
                            let private = style("private (npm publish will refuse)").yellow();
                            println!("{}", key_value("Visibility", &private.to_string()));
                        }
                    }
                    None => {
                        let missing = style("not found").yellow().to_string();
                        println!("{}", key_value("package.json", &missing));
                    }
                }
                println!();

                println!("{}", header("Strings"));
                let path = output::path_style().apply_to(strings_path.display());
                println!("{}", key_value("File", &path.to_string()));
                let entries = match string_count {
                    Some(count) => count.to_string(),
                    None => style("file not found").dim().to_string(),
                };
                println!("{}", key_value("Entries", &entries));
            }
        }

        Ok(())
    }
}
