//! Init command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use expo_inject_core::config::{
    validate_config, Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML,
};

use crate::cli::output;
use crate::cli::Cli;

/// Write a default expo-inject.toml
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Release branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Remote name
    #[arg(long)]
    pub remote: Option<String>,

    /// Branch on the remote to rebase onto
    #[arg(long)]
    pub base_branch: Option<String>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, output = ?self.output, "executing init command");
        let cwd = cli.working_dir()?;
        let config_path = cwd.join(
            self.output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_TOML)),
        );

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        let content = self.render()?;
        std::fs::write(&config_path, &content)?;

        if !cli.quiet {
            output::success(&format!(
                "Created {}",
                output::path_style().apply_to(config_path.display())
            ));
        }
        Ok(())
    }

    /// The commented template, or a rendered config when overrides are given
    fn render(&self) -> anyhow::Result<String> {
        if self.branch.is_none() && self.remote.is_none() && self.base_branch.is_none() {
            return Ok(DEFAULT_CONFIG_TEMPLATE.to_string());
        }

        let mut config = Config::default();
        if let Some(branch) = &self.branch {
            config.release.branch = branch.clone();
        }
        if let Some(remote) = &self.remote {
            config.release.remote = remote.clone();
        }
        if let Some(base) = &self.base_branch {
            config.release.base_branch = base.clone();
        }
        validate_config(&config)?;

        Ok(format!(
            "# expo-inject configuration\n\n{}",
            toml::to_string_pretty(&config)?
        ))
    }
}
