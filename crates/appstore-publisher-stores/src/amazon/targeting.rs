//! APK device targeting

use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::traits::AppstoreApi;
use crate::types::*;

/// Targeting resource client
pub struct TargetingService<'a, A: AppstoreApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: AppstoreApi + ?Sized> TargetingService<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Targeting of an APK, carrying the ETag of this read
    #[instrument(skip(self))]
    pub async fn get(&self, edit_id: &str, apk_id: &str) -> Result<ApkTargeting> {
        let targeting = self.api.get_targeting(edit_id, apk_id).await?;
        if targeting.etag.is_empty() {
            return Err(StoreError::MissingEtag(format!("targeting of APK {}", apk_id)));
        }
        debug!(
            devices = targeting.devices().count(),
            other = ?targeting.other_android_devices,
            "Fetched targeting"
        );
        Ok(targeting)
    }

    /// Overwrite the targeting of an APK, conditional on `targeting.etag`
    #[instrument(skip(self, targeting))]
    pub async fn set(&self, edit_id: &str, apk_id: &str, targeting: &ApkTargeting) -> Result<()> {
        self.api.set_targeting(edit_id, apk_id, targeting).await?;
        debug!("Updated targeting");
        Ok(())
    }
}

/// A copy of the rules that reaches no device
///
/// The catch-all becomes `NOT_TARGETING` and every `TARGETING` device is
/// flipped to `NOT_TARGETING`. Other statuses and the ETag are kept.
pub fn disable_targeting(targeting: &ApkTargeting) -> ApkTargeting {
    let disable = |device: &Device| {
        let mut device = device.clone();
        if device.status == TargetingStatus::Targeting {
            device.status = TargetingStatus::NotTargeting;
        }
        device
    };

    ApkTargeting {
        amazon_devices: targeting.amazon_devices.iter().map(disable).collect(),
        non_amazon_devices: targeting.non_amazon_devices.iter().map(disable).collect(),
        other_android_devices: Some(NOT_TARGETING.to_string()),
        etag: targeting.etag.clone(),
    }
}
