//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{CompletionsCommand, InitCommand, InjectCommand, ReleaseCommand, StatusCommand};

/// expo-inject - Android string injection and npm release automation
#[derive(Debug, Parser)]
#[command(name = "expo-inject")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upsert a <string> entry into the Android strings resource file
    Inject(InjectCommand),

    /// Cut and publish a release (checkout, rebase, bump, push, tag, publish)
    Release(ReleaseCommand),

    /// Show configuration, repository and resource status
    Status(StatusCommand),

    /// Write a default expo-inject.toml
    Init(InitCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Inject(cmd) => cmd.execute(self),
            Commands::Release(cmd) => cmd.execute(self),
            Commands::Status(cmd) => cmd.execute(self),
            Commands::Init(cmd) => cmd.execute(self),
            Commands::Completions(cmd) => cmd.execute(self),
        }
    }

    /// Directory commands operate on: `-C` if given, else the process cwd
    pub fn working_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Whether human-readable progress lines should be printed
    pub fn chatty(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}
