//! Edit commands

use clap::{Args, Subcommand};
use console::style;
use dialoguer::Confirm;
use tracing::info;

use appstore_publisher_core::connect;
use appstore_publisher_stores::amazon::EditService;

use super::CredentialArgs;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Inspect or discard the active edit
#[derive(Debug, Args)]
pub struct EditCommand {
    #[command(subcommand)]
    pub command: EditSubcommand,
}

/// Edit subcommands
#[derive(Debug, Subcommand)]
pub enum EditSubcommand {
    /// Show the active edit
    Show {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Delete the active edit, discarding everything on it
    Delete {
        /// Delete without asking for confirmation
        #[arg(short = 'y', long)]
        yes: bool,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

impl EditCommand {
    /// Execute the edit command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;

        match &self.command {
            EditSubcommand::Show { credentials } => rt.block_on(show(cli, credentials)),
            EditSubcommand::Delete { yes, credentials } => {
                rt.block_on(delete(cli, credentials, *yes))
            }
        }
    }
}

async fn show(cli: &Cli, credentials: &CredentialArgs) -> anyhow::Result<()> {
    info!("executing edit show command");
    let config = credentials.load_config(cli)?;
    let client = connect(&config).await?;
    let edit = EditService::new(&client).active().await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&edit)?);
        }
        OutputFormat::Text => match edit {
            Some(edit) => {
                println!("{}", output::header("Active edit"));
                println!(
                    "{}",
                    output::key_value("Id", &output::id_style().apply_to(&edit.id).to_string())
                );
                if let Some(status) = &edit.status {
                    println!("{}", output::key_value("Status", status));
                }
            }
            None => output::info("No active edit"),
        },
    }

    Ok(())
}

async fn delete(cli: &Cli, credentials: &CredentialArgs, yes: bool) -> anyhow::Result<()> {
    info!(yes, "executing edit delete command");
    let config = credentials.load_config(cli)?;
    let client = connect(&config).await?;
    let edits = EditService::new(&client);

    let Some(edit) = edits.active().await? else {
        if !cli.quiet {
            output::info("No active edit");
        }
        return Ok(());
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete edit {} and everything on it?",
                edit.id
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", style("Aborted.").yellow());
            return Ok(());
        }
    }

    edits.delete(&edit).await?;

    if !cli.quiet {
        output::success(&format!("Deleted edit {}", edit.id));
    }

    Ok(())
}
