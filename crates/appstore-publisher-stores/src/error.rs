//! Store error types

use thiserror::Error;

use crate::types::PublishPhase;

/// Store-related errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required input missing or unusable, detected before any network call
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Existing APK count on the edit differs from the number of files to publish
    #[error(
        "Number of existing APKs on edit ({existing}) does not match the number of APKs to upload ({requested})"
    )]
    CountMismatch { existing: usize, requested: usize },

    /// API error from store
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Upload failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Large upload succeeded but binding it to the edit did not
    #[error("Failed to attach uploaded APK to edit: {0}")]
    AttachFailed(String),

    /// A mutating call needs an ETag the server did not provide
    #[error("No ETag returned for {0}")]
    MissingEtag(String),

    /// A publishing phase failed
    #[error("{phase} failed: {source}")]
    PhaseFailed {
        phase: PublishPhase,
        #[source]
        source: Box<StoreError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Tag this error with the publishing phase it happened in
    pub fn in_phase(self, phase: PublishPhase) -> Self {
        match self {
            // Already attributed, or meaningful on its own
            StoreError::PhaseFailed { .. }
            | StoreError::CountMismatch { .. }
            | StoreError::ConfigurationError(_) => self,
            other => StoreError::PhaseFailed {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// The phase this error was raised in, if any
    pub fn phase(&self) -> Option<PublishPhase> {
        match self {
            StoreError::PhaseFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether this error stems from missing or invalid local configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::ConfigurationError(_) | StoreError::InvalidCredentials(_)
        )
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
