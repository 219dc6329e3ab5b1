//! Appstore API traits

use crate::error::Result;
use crate::types::*;

/// Raw calls against the Appstore edits API for one application
///
/// Each method is a single request. Methods that read a resource return the
/// response `ETag` on the value they produce; methods that mutate one take the
/// ETag to send as `If-Match`. Sequencing and ETag freshness are the caller's
/// job, see [`crate::amazon`].
#[async_trait::async_trait]
pub trait AppstoreApi: Send + Sync {
    /// The active edit, if any
    async fn get_active_edit(&self) -> Result<Option<Edit>>;

    /// Create a new edit
    async fn create_edit(&self) -> Result<Edit>;

    /// Delete an edit
    async fn delete_edit(&self, edit_id: &str, etag: &str) -> Result<()>;

    /// APKs on an edit, in server order. Entries carry no ETag.
    async fn list_apks(&self, edit_id: &str) -> Result<Vec<Apk>>;

    /// A single APK with its current ETag
    async fn get_apk(&self, edit_id: &str, apk_id: &str) -> Result<Apk>;

    /// Upload an APK in a single request
    async fn upload_apk(&self, edit_id: &str, payload: ApkPayload) -> Result<Apk>;

    /// Upload the bytes of a large APK, returning a reference to attach
    async fn upload_large_apk(
        &self,
        edit_id: &str,
        payload: ApkPayload,
    ) -> Result<LargeUploadReference>;

    /// Bind a large upload to the edit
    async fn attach_apk(&self, edit_id: &str, reference: &LargeUploadReference) -> Result<Apk>;

    /// Replace the content of an APK, keeping its id
    async fn replace_apk(
        &self,
        edit_id: &str,
        apk_id: &str,
        etag: &str,
        payload: ApkPayload,
    ) -> Result<()>;

    /// Remove an APK from the edit
    async fn delete_apk(&self, edit_id: &str, apk_id: &str, etag: &str) -> Result<()>;

    /// Targeting rules of an APK with the ETag of the targeting resource
    async fn get_targeting(&self, edit_id: &str, apk_id: &str) -> Result<ApkTargeting>;

    /// Overwrite the targeting rules of an APK, sending `targeting.etag` as `If-Match`
    async fn set_targeting(
        &self,
        edit_id: &str,
        apk_id: &str,
        targeting: &ApkTargeting,
    ) -> Result<()>;
}
