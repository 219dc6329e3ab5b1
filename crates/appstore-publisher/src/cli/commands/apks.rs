//! APK inspection commands

use clap::{Args, Subcommand};
use tracing::info;

use appstore_publisher_core::connect;
use appstore_publisher_stores::amazon::{ApkService, EditService};

use super::CredentialArgs;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Inspect APKs on the active edit
#[derive(Debug, Args)]
pub struct ApksCommand {
    #[command(subcommand)]
    pub command: ApksSubcommand,
}

/// APK subcommands
#[derive(Debug, Subcommand)]
pub enum ApksSubcommand {
    /// List APKs on the active edit
    List {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

impl ApksCommand {
    /// Execute the apks command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;

        match &self.command {
            ApksSubcommand::List { credentials } => rt.block_on(list(cli, credentials)),
        }
    }
}

async fn list(cli: &Cli, credentials: &CredentialArgs) -> anyhow::Result<()> {
    info!("executing apks list command");
    let config = credentials.load_config(cli)?;
    let client = connect(&config).await?;

    let edit = EditService::new(&client).active().await?;
    let apks = match &edit {
        Some(edit) => ApkService::new(&client).list(&edit.id).await?,
        None => Vec::new(),
    };

    match cli.format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "edit": edit, "apks": apks });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let Some(edit) = edit else {
                output::info("No active edit");
                return Ok(());
            };

            println!(
                "{} {}",
                output::header("Edit"),
                output::id_style().apply_to(&edit.id)
            );
            if apks.is_empty() {
                output::info("No APKs on this edit");
            }
            for apk in &apks {
                println!(
                    "  {:<24} {:>10}  {}",
                    output::id_style().apply_to(&apk.id),
                    apk.version_code,
                    apk.name
                );
            }
        }
    }

    Ok(())
}
