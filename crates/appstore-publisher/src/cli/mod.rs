//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use appstore_publisher_core::config::{load_config, load_config_or_default, Config};

use commands::{
    ApksCommand, CompletionsCommand, EditCommand, InitCommand, PublishCommand, TargetingCommand,
};

/// appstore-publish - Publish APKs to the Amazon Appstore
#[derive(Debug, Parser)]
#[command(name = "appstore-publish")]
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

    /// Configuration file (default: search the working directory and its parents)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

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
    /// Initialize a new configuration file
    Init(InitCommand),

    /// Publish APKs to the active edit
    Publish(PublishCommand),

    /// Inspect APKs on the active edit
    Apks(ApksCommand),

    /// Inspect device targeting of an APK
    Targeting(TargetingCommand),

    /// Inspect or discard the active edit
    Edit(EditCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Publish(ref cmd) => cmd.execute(&self),
            Commands::Apks(ref cmd) => cmd.execute(&self),
            Commands::Targeting(ref cmd) => cmd.execute(&self),
            Commands::Edit(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Console log directives used when RUST_LOG is not set
    ///
    /// `publish` shows the per-phase progress of the store client on stderr.
    pub fn console_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else if matches!(self.command, Commands::Publish(_)) {
            "warn,appstore_publisher_stores=info"
        } else {
            "warn"
        }
    }

    /// Load the configuration named by `--config`, or search for one
    pub fn load_config(&self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            return Ok(load_config(path)?);
        }

        let cwd = std::env::current_dir()?;
        let (config, path) = load_config_or_default(&cwd)?;
        debug!(path = ?path, "configuration resolved");
        Ok(config)
    }
}
