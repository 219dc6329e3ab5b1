//! Device targeting commands

use clap::{Args, Subcommand};
use tracing::info;

use appstore_publisher_core::connect;
use appstore_publisher_stores::amazon::{EditService, TargetingService};

use super::CredentialArgs;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Inspect device targeting of an APK
#[derive(Debug, Args)]
pub struct TargetingCommand {
    #[command(subcommand)]
    pub command: TargetingSubcommand,
}

/// Targeting subcommands
#[derive(Debug, Subcommand)]
pub enum TargetingSubcommand {
    /// Show the device targeting of an APK on the active edit
    Show {
        /// APK id (see `apks list`)
        apk_id: String,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

impl TargetingCommand {
    /// Execute the targeting command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;

        match &self.command {
            TargetingSubcommand::Show {
                apk_id,
                credentials,
            } => rt.block_on(show(cli, credentials, apk_id)),
        }
    }
}

async fn show(cli: &Cli, credentials: &CredentialArgs, apk_id: &str) -> anyhow::Result<()> {
    info!(apk_id, "executing targeting show command");
    let config = credentials.load_config(cli)?;
    let client = connect(&config).await?;

    let edit = EditService::new(&client)
        .active()
        .await?
        .ok_or_else(|| anyhow::anyhow!("No active edit"))?;
    let targeting = TargetingService::new(&client).get(&edit.id, apk_id).await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&targeting)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {}",
                output::header("Targeting of APK"),
                output::id_style().apply_to(apk_id)
            );
            output::print_targeting(&targeting);
        }
    }

    Ok(())
}
