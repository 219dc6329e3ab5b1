//! Publish workflow orchestration

use tracing::{debug, info};

use appstore_publisher_stores::amazon::{AppstoreClient, SecurityProfile};
use appstore_publisher_stores::{PublishReport, Publisher};

use crate::config::{validate_connection_inputs, validate_publish_inputs, Config};
use crate::error::Result;

/// Authenticate against the Appstore API with the configured credentials
pub async fn connect(config: &Config) -> Result<AppstoreClient> {
    let inputs = validate_connection_inputs(config)?;
    let profile = SecurityProfile::from_file(&inputs.security_profile)?;

    debug!(application_id = %inputs.application_id, "authenticating");
    let client = AppstoreClient::authenticate(&config.api, inputs.application_id, &profile).await?;
    Ok(client)
}

/// Execute a publish run for a configuration
pub struct PublishWorkflow<'a> {
    config: &'a Config,
    dry_run: bool,
}

impl<'a> PublishWorkflow<'a> {
    /// Create a new publish workflow
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Only read the edit and report what would change
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check if this is a dry run
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Validate inputs, authenticate and publish
    pub async fn execute(&self) -> Result<PublishReport> {
        let inputs = validate_publish_inputs(self.config)?;
        let options = self.config.publish_options(self.dry_run);

        info!(
            application_id = %inputs.application_id,
            apks = inputs.apks.len(),
            strategy = %options.strategy,
            replace_edit = options.replace_edit,
            dry_run = self.dry_run,
            "executing publish workflow"
        );

        let client = connect(self.config).await?;
        let report = Publisher::new(&client, options).publish(&inputs.apks).await?;

        debug!(edit = ?report.edit_id, published = report.published_apks.len(), "publish workflow complete");
        Ok(report)
    }
}
