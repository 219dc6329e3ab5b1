//! Publish command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use appstore_publisher_core::config::Config;
use appstore_publisher_core::PublishWorkflow;
use appstore_publisher_stores::{PublishReport, PublishStrategy};

use super::CredentialArgs;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Publish APKs to the active edit
#[derive(Debug, Args)]
pub struct PublishCommand {
    /// APK files, in the order of the APKs already on the edit (overrides `apks` from config)
    pub apks: Vec<PathBuf>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Delete the active edit and publish to a new one
    #[arg(long)]
    pub replace_edit: bool,

    /// Replace APK content in place instead of uploading new APKs
    #[arg(long)]
    pub replace_apks: bool,

    /// Show what would change without modifying the edit
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut config = cli.load_config()?;
        self.apply(&mut config);

        info!(
            apks = config.apks.len(),
            replace_edit = config.replace_edit,
            replace_apks = config.replace_apks,
            dry_run = self.dry_run,
            "executing publish command"
        );

        if !cli.quiet && cli.format == OutputFormat::Text {
            println!(
                "{} {} APK(s) to {}",
                if self.dry_run {
                    style("Planning").yellow()
                } else {
                    style("Publishing").cyan()
                },
                config.apks.len(),
                style(config.application_id.as_deref().unwrap_or("<unset>")).bold()
            );
        }

        let workflow = PublishWorkflow::new(&config).with_dry_run(self.dry_run);
        let rt = tokio::runtime::Runtime::new()?;
        let report = rt.block_on(workflow.execute())?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_report(&report);
                }
            }
        }

        Ok(())
    }

    /// Let flags and environment override the configuration file
    fn apply(&self, config: &mut Config) {
        if !self.apks.is_empty() {
            config.apks = self.apks.clone();
        }
        self.credentials.apply(config);
        config.replace_edit |= self.replace_edit;
        config.replace_apks |= self.replace_apks;
    }
}

fn print_report(report: &PublishReport) {
    println!();
    println!("{}", output::header("Publish summary"));
    println!(
        "{}",
        output::key_value(
            "Edit",
            &report
                .edit_id
                .as_deref()
                .map(|id| output::id_style().apply_to(id).to_string())
                .unwrap_or_else(|| "(new edit)".to_string())
        )
    );
    println!("{}", output::key_value("Strategy", &report.strategy.to_string()));
    if report.edit_replaced {
        println!("{}", output::key_value("Previous edit", "deleted"));
    }
    if report.edit_created {
        println!("{}", output::key_value("Edit created", "yes"));
    }
    println!(
        "{}",
        output::key_value("Existing APKs", &join_or_none(&report.existing_apks))
    );

    if report.dry_run {
        println!();
        output::warning("Dry run: nothing was changed");
        return;
    }

    for apk in &report.published_apks {
        let version = apk
            .version_code
            .map(|code| format!(" (version code {})", code))
            .unwrap_or_default();
        println!(
            "  {} {}{} <- {}",
            style("+").green(),
            output::id_style().apply_to(&apk.id),
            version,
            apk.file.display()
        );
    }
    for id in &report.removed_apks {
        println!("  {} {}", style("-").red(), id);
    }

    println!();
    match report.strategy {
        PublishStrategy::ReplaceInPlace => {
            output::success(&format!("Replaced {} APK(s)", report.published_apks.len()))
        }
        PublishStrategy::UploadNewDeleteOld => output::success(&format!(
            "Published {} APK(s), removed {}",
            report.published_apks.len(),
            report.removed_apks.len()
        )),
    }
}

fn join_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.join(", ")
    }
}
