//! Common types for the Amazon Appstore API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Default Appstore API base URL
pub const DEFAULT_BASE_URL: &str = "https://developer.amazon.com/api/appstore/";

/// Default Appstore API version segment
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default Login with Amazon token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

/// Files at or above this size go through the large upload endpoint (300 MiB)
pub const LARGE_UPLOAD_THRESHOLD: u64 = 300 * 1024 * 1024;

/// Catch-all and device status value for "not targeted"
pub const NOT_TARGETING: &str = "NOT_TARGETING";

/// Device status value for "targeted"
pub const TARGETING: &str = "TARGETING";

/// HTTP client and endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Appstore REST API
    pub base_url: String,

    /// API version path segment (e.g., "v1")
    pub version: String,

    /// OAuth token endpoint
    pub token_url: String,

    /// Read timeout in seconds
    pub read_timeout_secs: u64,

    /// Write timeout in seconds
    pub write_timeout_secs: u64,

    /// Size in bytes from which the large upload flow is used
    pub large_upload_threshold_bytes: u64,

    /// Seconds to wait between a large upload and attaching it to the edit
    pub attach_delay_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            read_timeout_secs: 30,
            write_timeout_secs: 60,
            large_upload_threshold_bytes: LARGE_UPLOAD_THRESHOLD,
            attach_delay_secs: 60,
        }
    }
}

impl ApiConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn attach_delay(&self) -> Duration {
        Duration::from_secs(self.attach_delay_secs)
    }
}

/// A draft of the store listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Edit identifier
    pub id: String,

    /// Edit status as reported by the store (e.g., "IN_PROGRESS")
    #[serde(default)]
    pub status: Option<String>,

    /// ETag captured from the response that produced this value
    #[serde(skip)]
    pub etag: String,
}

/// An APK attached to an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apk {
    /// Android version code
    pub version_code: i64,

    /// Server-assigned identifier, new on every upload
    pub id: String,

    /// Display name
    pub name: String,

    /// ETag captured from the response that produced this value
    #[serde(skip)]
    pub etag: String,
}

/// Device targeting status
///
/// Values other than `TARGETING` and `NOT_TARGETING` are kept verbatim so
/// they survive a read-modify-write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetingStatus {
    Targeting,
    NotTargeting,
    Other(String),
}

impl From<String> for TargetingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            TARGETING => TargetingStatus::Targeting,
            NOT_TARGETING => TargetingStatus::NotTargeting,
            _ => TargetingStatus::Other(value),
        }
    }
}

impl From<TargetingStatus> for String {
    fn from(status: TargetingStatus) -> Self {
        match status {
            TargetingStatus::Targeting => TARGETING.to_string(),
            TargetingStatus::NotTargeting => NOT_TARGETING.to_string(),
            TargetingStatus::Other(value) => value,
        }
    }
}

impl std::fmt::Display for TargetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetingStatus::Targeting => write!(f, "{}", TARGETING),
            TargetingStatus::NotTargeting => write!(f, "{}", NOT_TARGETING),
            TargetingStatus::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Explanation attached to a device status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub details: Vec<String>,
}

/// A single device entry in a targeting rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub status: TargetingStatus,
    #[serde(default)]
    pub reason: Option<Reason>,
}

/// Device targeting rules of an APK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApkTargeting {
    /// Amazon devices, in server order
    #[serde(default)]
    pub amazon_devices: Vec<Device>,

    /// Non-Amazon devices, in server order
    #[serde(default)]
    pub non_amazon_devices: Vec<Device>,

    /// Catch-all setting for devices not listed (e.g., "ALL", "NOT_TARGETING")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_android_devices: Option<String>,

    /// ETag of the targeting resource this value was read from.
    /// Transport metadata only, never part of the body.
    #[serde(skip)]
    pub etag: String,
}

impl ApkTargeting {
    /// Replace the concurrency token, keeping the rules
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = etag.into();
        self
    }

    /// All device entries, Amazon devices first
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.amazon_devices.iter().chain(self.non_amazon_devices.iter())
    }
}

/// Opaque file reference returned by the large upload endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargeUploadReference(pub String);

impl LargeUploadReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// APK file contents ready to be sent
#[derive(Clone)]
pub struct ApkPayload {
    /// File name sent alongside the upload
    pub filename: String,

    /// Raw file bytes
    pub bytes: Vec<u8>,

    /// Hex SHA-256 of the bytes
    pub sha256: String,
}

impl ApkPayload {
    /// Build a payload from bytes already in memory
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        Self {
            filename: filename.into(),
            bytes,
            sha256,
        }
    }

    /// Read an APK from disk
    pub async fn read(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StoreError::ConfigurationError(format!("Invalid APK path: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(filename, bytes))
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for ApkPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApkPayload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .field("sha256", &self.sha256)
            .finish()
    }
}

/// How new APKs take the place of the ones already on the edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStrategy {
    /// Replace each existing APK's content in place, keeping ids and targeting
    ReplaceInPlace,
    /// Upload new APKs, move targeting over, then delete the old APKs
    #[default]
    UploadNewDeleteOld,
}

impl std::fmt::Display for PublishStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStrategy::ReplaceInPlace => write!(f, "replace in place"),
            PublishStrategy::UploadNewDeleteOld => write!(f, "upload new, delete old"),
        }
    }
}

/// Steps of a publish run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishPhase {
    ResolveEdit,
    Replace,
    Snapshot,
    Upload,
    DisableOldTargeting,
    MigrateTargeting,
    DeleteOld,
}

impl std::fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishPhase::ResolveEdit => write!(f, "Resolving edit"),
            PublishPhase::Replace => write!(f, "Replacing APKs"),
            PublishPhase::Snapshot => write!(f, "Getting targeting for old APKs"),
            PublishPhase::Upload => write!(f, "Uploading new APKs"),
            PublishPhase::DisableOldTargeting => write!(f, "Removing targeting for old APKs"),
            PublishPhase::MigrateTargeting => write!(f, "Setting targeting for new APKs"),
            PublishPhase::DeleteOld => write!(f, "Deleting old APKs"),
        }
    }
}

/// Options for a publish run
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Delete the active edit before starting
    pub replace_edit: bool,

    /// Replacement strategy
    pub strategy: PublishStrategy,

    /// Resolve and check without changing anything on the store
    pub dry_run: bool,

    /// Size in bytes from which the large upload flow is used
    pub large_upload_threshold: u64,

    /// Wait between a large upload and its attach call
    pub attach_delay: Duration,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            replace_edit: false,
            strategy: PublishStrategy::default(),
            dry_run: false,
            large_upload_threshold: LARGE_UPLOAD_THRESHOLD,
            attach_delay: ApiConfig::default().attach_delay(),
        }
    }
}

impl PublishOptions {
    /// Take upload tuning from the API configuration
    pub fn with_api_config(mut self, config: &ApiConfig) -> Self {
        self.large_upload_threshold = config.large_upload_threshold_bytes;
        self.attach_delay = config.attach_delay();
        self
    }
}

/// An APK published by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedApk {
    /// APK id on the edit
    pub id: String,

    /// Version code, when the store returned one
    pub version_code: Option<i64>,

    /// Local file that was sent
    pub file: PathBuf,

    /// Hex SHA-256 of the file
    pub sha256: String,
}

/// Summary of a publish run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReport {
    /// Edit the APKs were published to (None when a dry run found no edit)
    pub edit_id: Option<String>,

    /// Strategy used
    pub strategy: PublishStrategy,

    /// Whether nothing was changed
    pub dry_run: bool,

    /// Whether a previously active edit was deleted
    pub edit_replaced: bool,

    /// Whether a new edit was created
    pub edit_created: bool,

    /// APK ids present on the edit before the run
    pub existing_apks: Vec<String>,

    /// APK ids deleted by the run
    pub removed_apks: Vec<String>,

    /// APKs published by the run
    pub published_apks: Vec<PublishedApk>,

    /// Completion time
    pub completed_at: DateTime<Utc>,
}
