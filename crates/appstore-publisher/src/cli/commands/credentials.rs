//! Credential options shared by every command that talks to the Appstore

use std::path::PathBuf;

use clap::Args;

use appstore_publisher_core::config::Config;

use crate::cli::Cli;

/// Security profile and application id, from flags or environment
#[derive(Debug, Clone, Default, Args)]
pub struct CredentialArgs {
    /// Path to the Login with Amazon security profile JSON
    #[arg(long, env = "AMAZON_SECURITY_PROFILE")]
    pub security_profile: Option<PathBuf>,

    /// Appstore application id
    #[arg(long, env = "AMAZON_APPLICATION_ID")]
    pub application_id: Option<String>,
}

impl CredentialArgs {
    /// Let flags and environment override the configuration file
    pub fn apply(&self, config: &mut Config) {
        if let Some(profile) = &self.security_profile {
            config.security_profile = Some(profile.clone());
        }
        if let Some(application_id) = &self.application_id {
            config.application_id = Some(application_id.clone());
        }
    }

    /// Load the configuration and apply the overrides
    pub fn load_config(&self, cli: &Cli) -> anyhow::Result<Config> {
        let mut config = cli.load_config()?;
        self.apply(&mut config);
        Ok(config)
    }
}
