//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use appstore_publisher_stores::{ApiConfig, PublishOptions, PublishStrategy};

/// Main configuration for a publish run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the Login with Amazon security profile JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_profile: Option<PathBuf>,

    /// Appstore application identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// APK files to publish, paired by position with the APKs on the edit
    pub apks: Vec<PathBuf>,

    /// Delete the active edit and start from a new one
    pub replace_edit: bool,

    /// Replace APK content in place instead of uploading new APKs
    pub replace_apks: bool,

    /// API and HTTP client settings
    pub api: ApiConfig,
}

impl Config {
    /// Strategy selected by `replace_apks`
    pub fn strategy(&self) -> PublishStrategy {
        if self.replace_apks {
            PublishStrategy::ReplaceInPlace
        } else {
            PublishStrategy::UploadNewDeleteOld
        }
    }

    /// Options for the publisher
    pub fn publish_options(&self, dry_run: bool) -> PublishOptions {
        PublishOptions {
            replace_edit: self.replace_edit,
            strategy: self.strategy(),
            dry_run,
            ..Default::default()
        }
        .with_api_config(&self.api)
    }

    /// Make relative paths relative to `base` (the config file's directory)
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(profile) = &self.security_profile {
            if profile.is_relative() {
                self.security_profile = Some(base.join(profile));
            }
        }

        for apk in &mut self.apks {
            if apk.is_relative() {
                *apk = base.join(&*apk);
            }
        }
    }
}
