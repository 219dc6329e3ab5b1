//! Login with Amazon authentication
//!
//! Exchanges a security profile (client id and secret) for a short-lived
//! bearer token using the client-credentials grant.

use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};

/// OAuth scope required by the Appstore edits API
pub const APPSTORE_SCOPE: &str = "appstore::apps:readwrite";

/// Login with Amazon client credentials
#[derive(Clone, Deserialize)]
pub struct SecurityProfile {
    pub client_id: String,
    pub client_secret: String,
}

/// Accepted layouts of a security profile file
#[derive(Deserialize)]
#[serde(untagged)]
enum SecurityProfileFile {
    /// As downloaded from the developer console
    Web { web: SecurityProfile },
    Flat(SecurityProfile),
}

impl SecurityProfile {
    /// Load a security profile from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::ConfigurationError(format!(
                "Failed to read security profile {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse a security profile from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let file: SecurityProfileFile = serde_json::from_str(content).map_err(|e| {
            StoreError::InvalidCredentials(format!("Invalid security profile: {}", e))
        })?;

        let profile = match file {
            SecurityProfileFile::Web { web } => web,
            SecurityProfileFile::Flat(profile) => profile,
        };

        if profile.client_id.trim().is_empty() || profile.client_secret.trim().is_empty() {
            return Err(StoreError::InvalidCredentials(
                "Security profile is missing client_id or client_secret".to_string(),
            ));
        }

        Ok(profile)
    }
}

impl std::fmt::Debug for SecurityProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityProfile")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token for the Appstore API
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: 0,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Fetch a bearer token for a security profile
#[instrument(skip(client, profile), fields(client_id = %profile.client_id))]
pub async fn fetch_token(
    client: &Client,
    token_url: &str,
    profile: &SecurityProfile,
) -> Result<AccessToken> {
    info!("Authenticating with Login with Amazon");

    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", profile.client_id.as_str()),
            ("client_secret", profile.client_secret.as_str()),
            ("scope", APPSTORE_SCOPE),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(StoreError::AuthenticationFailed(format!(
            "{} - {}",
            status.as_u16(),
            error_text
        )));
    }

    let token: AccessToken = response.json().await?;
    if token.access_token.is_empty() {
        return Err(StoreError::AuthenticationFailed(
            "Token response did not contain an access token".to_string(),
        ));
    }

    debug!(expires_in = token.expires_in, "Received access token");
    Ok(token)
}
