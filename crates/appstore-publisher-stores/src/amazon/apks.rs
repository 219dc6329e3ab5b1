//! APK operations on an edit

use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};
use crate::traits::AppstoreApi;
use crate::types::*;

/// APK resource client
///
/// Replace and delete always read the APK first so the `If-Match` they send
/// is the ETag of the immediately preceding read.
pub struct ApkService<'a, A: AppstoreApi + ?Sized> {
    api: &'a A,
    large_upload_threshold: u64,
    attach_delay: Duration,
}

impl<'a, A: AppstoreApi + ?Sized> ApkService<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            large_upload_threshold: LARGE_UPLOAD_THRESHOLD,
            attach_delay: Duration::ZERO,
        }
    }

    /// Size from which uploads go through the large upload flow
    pub fn with_large_upload_threshold(mut self, bytes: u64) -> Self {
        self.large_upload_threshold = bytes;
        self
    }

    /// Wait between a large upload and its attach call
    pub fn with_attach_delay(mut self, delay: Duration) -> Self {
        self.attach_delay = delay;
        self
    }

    /// APKs on the edit, in server order
    pub async fn list(&self, edit_id: &str) -> Result<Vec<Apk>> {
        let apks = self.api.list_apks(edit_id).await?;
        debug!(edit_id, count = apks.len(), "Listed APKs");
        Ok(apks)
    }

    /// A single APK with a current ETag
    pub async fn get(&self, edit_id: &str, apk_id: &str) -> Result<Apk> {
        self.api.get_apk(edit_id, apk_id).await
    }

    /// Upload an APK, picking the direct or large upload flow by size
    #[instrument(skip(self, payload), fields(file = %payload.filename, size = payload.size()))]
    pub async fn upload(&self, edit_id: &str, payload: ApkPayload) -> Result<Apk> {
        if payload.size() < self.large_upload_threshold {
            info!("Uploading APK");
            return self.api.upload_apk(edit_id, payload).await;
        }

        info!("Uploading large APK");
        let reference = self.api.upload_large_apk(edit_id, payload).await?;

        if !self.attach_delay.is_zero() {
            info!(delay_secs = self.attach_delay.as_secs(), "Waiting before attaching large APK");
            tokio::time::sleep(self.attach_delay).await;
        }

        let apk = self.api.attach_apk(edit_id, &reference).await?;
        info!(apk_id = %apk.id, "Attached large APK to edit");
        Ok(apk)
    }

    /// Replace an APK's content in place; its id is kept
    #[instrument(skip(self, payload), fields(file = %payload.filename))]
    pub async fn replace(&self, edit_id: &str, apk_id: &str, payload: ApkPayload) -> Result<()> {
        let current = self.fresh(edit_id, apk_id).await?;
        self.api
            .replace_apk(edit_id, apk_id, &current.etag, payload)
            .await?;
        info!("Replaced APK");
        Ok(())
    }

    /// Remove an APK from the edit
    #[instrument(skip(self))]
    pub async fn delete(&self, edit_id: &str, apk_id: &str) -> Result<()> {
        let current = self.fresh(edit_id, apk_id).await?;
        self.api.delete_apk(edit_id, apk_id, &current.etag).await?;
        info!("Deleted APK");
        Ok(())
    }

    async fn fresh(&self, edit_id: &str, apk_id: &str) -> Result<Apk> {
        let apk = self.get(edit_id, apk_id).await?;
        if apk.etag.is_empty() {
            return Err(StoreError::MissingEtag(format!("APK {}", apk_id)));
        }
        Ok(apk)
    }
}
