//! Inject command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use expo_inject_android::{
    inject, load_plugin_requests, InjectOutcome, ResourceDocument, ResourceFile,
    StringResourceRequest,
};
use expo_inject_core::config::load_config_or_default;
use expo_inject_core::ExpoInjectError;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Upsert a <string> entry into the Android strings resource file
#[derive(Debug, Args)]
pub struct InjectCommand {
    /// Resource name (the `name` attribute)
    #[arg(long, required_unless_present = "app_config")]
    pub name: Option<String>,

    /// String value
    #[arg(long, required_unless_present = "app_config", allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Value of the `translatable` attribute ("true" or "false")
    #[arg(long)]
    pub translatable: Option<String>,

    /// Value of the `tools:targetApi` attribute
    #[arg(long)]
    pub target_api: Option<String>,

    /// Resource file the entry belongs to [default: strings.xml]
    #[arg(long)]
    pub file: Option<String>,

    /// Apply every matching plugin entry from an Expo app.json instead
    #[arg(
        long,
        value_name = "APP_JSON",
        conflicts_with_all = ["name", "value", "translatable", "target_api", "file"]
    )]
    pub app_config: Option<PathBuf>,

    /// Path of strings.xml (defaults to the configured strings_path)
    #[arg(long, value_name = "PATH")]
    pub strings: Option<PathBuf>,

    /// Print the resulting XML instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl InjectCommand {
    /// Execute the inject command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            name = ?self.name,
            app_config = ?self.app_config,
            dry_run = self.dry_run,
            "executing inject command"
        );
        let cwd = cli.working_dir()?;
        let (config, _) = load_config_or_default(&cwd)?;

        let requests = match &self.app_config {
            Some(app_config) => {
                load_plugin_requests(&cwd.join(app_config), &config.inject.plugin_names)?
            }
            None => vec![self.request()?],
        };

        let strings_path = cwd.join(
            self.strings
                .as_ref()
                .unwrap_or(&config.inject.strings_path),
        );

        if requests.is_empty() {
            if cli.chatty() {
                output::warning(&format!(
                    "No {} plugin entries found, nothing to inject",
                    config.inject.plugin_names.join(" / ")
                ));
            }
            return Ok(());
        }

        let mut document = ResourceDocument::load(&strings_path)?;
        let mut results = Vec::with_capacity(requests.len());
        for request in &requests {
            let outcome = inject(&mut document, request)?;
            results.push((request.name.clone(), outcome));
        }

        let xml = document.to_xml()?;
        if !self.dry_run {
            document.save(&strings_path)?;
        }

        match cli.format {
            OutputFormat::Json => {
                let dry_run_xml = self.dry_run.then_some(&xml);
                let output = serde_json::json!({
                    "path": strings_path.to_string_lossy(),
                    "dry_run": self.dry_run,
                    "entries": results.iter().map(|(name, outcome)| serde_json::json!({
                        "name": name,
                        "outcome": outcome,
                    })).collect::<Vec<_>>(),
                    "xml": dry_run_xml,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if self.dry_run {
                    print!("{}", xml);
                } else if !cli.quiet {
                    for (name, outcome) in &results {
                        let verb = match outcome {
                            InjectOutcome::Added => "Added",
                            InjectOutcome::Replaced => "Replaced",
                        };
                        output::success(&format!(
                            "{} string {} in {}",
                            verb,
                            style(name).green().bold(),
                            output::path_style().apply_to(strings_path.display())
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Build the request from command-line flags
    fn request(&self) -> Result<StringResourceRequest, ExpoInjectError> {
        let file = match &self.file {
            Some(file) => file.parse()?,
            None => ResourceFile::default(),
        };
        Ok(StringResourceRequest {
            file,
            name: self.name.clone().unwrap_or_default(),
            value: self.value.clone().unwrap_or_default(),
            translatable: self.translatable.clone(),
            target_api: self.target_api.clone(),
        })
    }
}
