//! Configuration validation

use std::path::PathBuf;

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_api(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_api(config: &Config) -> Result<()> {
    let api = &config.api;

    if url::Url::parse(&api.base_url).is_err() {
        return Err(ConfigError::InvalidValue {
            field: "api.base_url".to_string(),
            message: format!("'{}' is not a valid URL", api.base_url),
        }
        .into());
    }

    if url::Url::parse(&api.token_url).is_err() {
        return Err(ConfigError::InvalidValue {
            field: "api.token_url".to_string(),
            message: format!("'{}' is not a valid URL", api.token_url),
        }
        .into());
    }

    if api.version.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "api.version".to_string(),
            message: "version cannot be empty".to_string(),
        }
        .into());
    }

    if api.read_timeout_secs == 0 || api.write_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "api.read_timeout_secs / api.write_timeout_secs".to_string(),
            message: "timeouts must be greater than zero".to_string(),
        }
        .into());
    }

    if api.large_upload_threshold_bytes == 0 {
        return Err(ConfigError::InvalidValue {
            field: "api.large_upload_threshold_bytes".to_string(),
            message: "threshold must be greater than zero".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Inputs needed to talk to the Appstore API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInputs {
    pub security_profile: PathBuf,
    pub application_id: String,
}

/// Inputs needed for a publish run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishInputs {
    pub security_profile: PathBuf,
    pub application_id: String,
    pub apks: Vec<PathBuf>,
}

/// Check that credentials and the application id are configured
pub fn validate_connection_inputs(config: &Config) -> Result<ConnectionInputs> {
    let security_profile = config.security_profile.clone().ok_or_else(|| {
        ConfigError::missing(
            "security_profile",
            "set it in the config file, pass --security-profile or AMAZON_SECURITY_PROFILE",
        )
    })?;

    let application_id = config
        .application_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ConfigError::missing(
                "application_id",
                "set it in the config file, pass --application-id or AMAZON_APPLICATION_ID",
            )
        })?
        .to_string();

    Ok(ConnectionInputs {
        security_profile,
        application_id,
    })
}

/// Check everything a publish run needs before any network call is made
pub fn validate_publish_inputs(config: &Config) -> Result<PublishInputs> {
    let ConnectionInputs {
        security_profile,
        application_id,
    } = validate_connection_inputs(config)?;

    if config.apks.is_empty() {
        return Err(ConfigError::missing("apks", "list at least one APK to publish").into());
    }

    for apk in &config.apks {
        if !apk.is_file() {
            return Err(ConfigError::ApkNotFound(apk.clone()).into());
        }
    }

    Ok(PublishInputs {
        security_profile,
        application_id,
        apks: config.apks.clone(),
    })
}
