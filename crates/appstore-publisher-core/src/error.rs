//! Error types for appstore-publisher

use std::path::PathBuf;
use thiserror::Error;

use appstore_publisher_stores::StoreError;

/// Result type alias using PublisherError
pub type Result<T> = std::result::Result<T, PublisherError>;

/// Main error type for appstore-publisher operations
#[derive(Debug, Error)]
pub enum PublisherError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Appstore API and publishing errors
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PublisherError {
    /// Whether the run failed on local configuration rather than on the store
    pub fn is_configuration(&self) -> bool {
        match self {
            PublisherError::Config(_) => true,
            PublisherError::Store(e) => e.is_configuration(),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {field} ({hint})")]
    MissingField { field: String, hint: String },

    /// APK listed in the configuration does not exist
    #[error("APK not found: {0}")]
    ApkNotFound(PathBuf),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn missing(field: &str, hint: &str) -> Self {
        ConfigError::MissingField {
            field: field.to_string(),
            hint: hint.to_string(),
        }
    }
}
