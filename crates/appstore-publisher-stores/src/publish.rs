//! APK publishing orchestration
//!
//! Resolves the edit to work on, then puts the new APKs in place of the ones
//! already on it with one of two strategies:
//!
//! - **Replace in place**: each existing APK's content is replaced by the file
//!   at the same position. Ids and targeting are kept by the store.
//! - **Upload new, delete old** (default): five phases, each finished for every
//!   APK before the next starts:
//!   1. snapshot the targeting of every existing APK
//!   2. upload every new file
//!   3. disable the targeting of the old APKs
//!   4. apply the snapshot at position `i` to new APK `i`
//!   5. delete the old APKs
//!
//! Old and new APKs are paired by position only. A failure stops the run at
//! once; nothing done by earlier phases is undone, the edit is left for the
//! operator to inspect or discard.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::amazon::{disable_targeting, ApkService, EditService, TargetingService};
use crate::error::{Result, StoreError};
use crate::traits::AppstoreApi;
use crate::types::*;

/// Orchestrates a publish run against one application
pub struct Publisher<'a, A: AppstoreApi + ?Sized> {
    api: &'a A,
    options: PublishOptions,
}

/// Outcome of edit resolution
struct ResolvedEdit {
    edit: Edit,
    replaced: bool,
    created: bool,
}

/// Fail unless there is exactly one existing APK per file
fn ensure_count(existing: usize, requested: usize) -> Result<()> {
    if existing != requested {
        return Err(StoreError::CountMismatch {
            existing,
            requested,
        });
    }
    Ok(())
}

async fn read_payload(file: &Path, phase: PublishPhase) -> Result<ApkPayload> {
    ApkPayload::read(file).await.map_err(|e| e.in_phase(phase))
}

impl<'a, A: AppstoreApi + ?Sized> Publisher<'a, A> {
    pub fn new(api: &'a A, options: PublishOptions) -> Self {
        Self { api, options }
    }

    fn apk_service(&self) -> ApkService<'a, A> {
        ApkService::new(self.api)
            .with_large_upload_threshold(self.options.large_upload_threshold)
            .with_attach_delay(self.options.attach_delay)
    }

    fn report(&self) -> PublishReport {
        PublishReport {
            edit_id: None,
            strategy: self.options.strategy,
            dry_run: self.options.dry_run,
            edit_replaced: false,
            edit_created: false,
            existing_apks: Vec::new(),
            removed_apks: Vec::new(),
            published_apks: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    /// Publish the given APK files
    #[instrument(skip(self, files), fields(files = files.len(), strategy = %self.options.strategy))]
    pub async fn publish(&self, files: &[PathBuf]) -> Result<PublishReport> {
        if files.is_empty() {
            return Err(StoreError::ConfigurationError("No APKs to upload".to_string()));
        }

        if self.options.dry_run {
            return self.plan(files).await;
        }

        let resolved = self
            .resolve_edit()
            .await
            .map_err(|e| e.in_phase(PublishPhase::ResolveEdit))?;
        let edit = resolved.edit;

        let mut report = self.report();
        report.edit_id = Some(edit.id.clone());
        report.edit_replaced = resolved.replaced;
        report.edit_created = resolved.created;

        match self.options.strategy {
            PublishStrategy::ReplaceInPlace => {
                self.replace_in_place(&edit, files, &mut report).await?
            }
            PublishStrategy::UploadNewDeleteOld => {
                self.upload_new_delete_old(&edit, files, &mut report)
                    .await?
            }
        }

        report.completed_at = Utc::now();
        info!(
            edit_id = %edit.id,
            published = report.published_apks.len(),
            removed = report.removed_apks.len(),
            "New APK(s) published to the Amazon Appstore"
        );
        Ok(report)
    }

    /// Delete the active edit if asked to, then reuse or create one
    async fn resolve_edit(&self) -> Result<ResolvedEdit> {
        let edits = EditService::new(self.api);
        let mut replaced = false;

        if self.options.replace_edit {
            if let Some(active) = edits.active().await? {
                edits.delete(&active).await?;
                replaced = true;
            }
        }

        let (edit, created) = edits.active_or_create().await?;
        debug!(edit_id = %edit.id, replaced, created, "Resolved edit");

        Ok(ResolvedEdit {
            edit,
            replaced,
            created,
        })
    }

    /// Read-only run: report what would happen without changing the store
    async fn plan(&self, files: &[PathBuf]) -> Result<PublishReport> {
        let mut report = self.report();
        let active = EditService::new(self.api)
            .active()
            .await
            .map_err(|e| e.in_phase(PublishPhase::ResolveEdit))?;

        let edit = match active {
            Some(edit) if !self.options.replace_edit => edit,
            Some(edit) => {
                info!(edit_id = %edit.id, "Dry run: would delete the active edit and create a new one");
                report.edit_replaced = true;
                report.edit_created = true;
                return Ok(report);
            }
            None => {
                info!("Dry run: would create a new edit");
                report.edit_created = true;
                return Ok(report);
            }
        };

        report.edit_id = Some(edit.id.clone());
        let existing = self
            .apk_service()
            .list(&edit.id)
            .await
            .map_err(|e| e.in_phase(PublishPhase::Snapshot))?;
        report.existing_apks = existing.iter().map(|a| a.id.clone()).collect();
        ensure_count(existing.len(), files.len())?;

        for (apk, file) in existing.iter().zip(files) {
            info!(apk_id = %apk.id, file = %file.display(), "Dry run: would replace");
        }
        report.completed_at = Utc::now();
        Ok(report)
    }

    /// Replace each existing APK with the file at the same position
    async fn replace_in_place(
        &self,
        edit: &Edit,
        files: &[PathBuf],
        report: &mut PublishReport,
    ) -> Result<()> {
        let phase = PublishPhase::Replace;
        let apks = self.apk_service();

        let existing = apks.list(&edit.id).await.map_err(|e| e.in_phase(phase))?;
        report.existing_apks = existing.iter().map(|a| a.id.clone()).collect();
        ensure_count(existing.len(), files.len())?;

        info!(phase = %phase, count = files.len(), "Replacing APKs in existing edit");
        for (apk, file) in existing.iter().zip(files) {
            info!(apk_id = %apk.id, file = %file.display(), "Uploading");
            let payload = read_payload(file, phase).await?;
            let sha256 = payload.sha256.clone();

            apks.replace(&edit.id, &apk.id, payload)
                .await
                .map_err(|e| e.in_phase(phase))?;

            report.published_apks.push(PublishedApk {
                id: apk.id.clone(),
                version_code: None,
                file: file.clone(),
                sha256,
            });
        }

        Ok(())
    }

    /// Upload new APKs, move the old targeting onto them, delete the old APKs
    async fn upload_new_delete_old(
        &self,
        edit: &Edit,
        files: &[PathBuf],
        report: &mut PublishReport,
    ) -> Result<()> {
        let apks = self.apk_service();
        let targeting = TargetingService::new(self.api);

        // 1. Snapshot old targeting
        let phase = PublishPhase::Snapshot;
        info!(phase = %phase, "Getting targeting for old APK(s) in edit");
        let old_apks = apks.list(&edit.id).await.map_err(|e| e.in_phase(phase))?;
        report.existing_apks = old_apks.iter().map(|a| a.id.clone()).collect();
        ensure_count(old_apks.len(), files.len())?;

        let mut snapshot: Vec<(Apk, ApkTargeting)> = Vec::with_capacity(old_apks.len());
        for apk in old_apks {
            let rules = targeting
                .get(&edit.id, &apk.id)
                .await
                .map_err(|e| e.in_phase(phase))?;
            snapshot.push((apk, rules));
        }

        // 2. Upload new APKs, in input order
        let phase = PublishPhase::Upload;
        info!(phase = %phase, count = files.len(), "Uploading new APK(s)");
        let mut new_apks: Vec<Apk> = Vec::with_capacity(files.len());
        for file in files {
            let payload = read_payload(file, phase).await?;
            let sha256 = payload.sha256.clone();
            let apk = apks
                .upload(&edit.id, payload)
                .await
                .map_err(|e| e.in_phase(phase))?;

            report.published_apks.push(PublishedApk {
                id: apk.id.clone(),
                version_code: Some(apk.version_code),
                file: file.clone(),
                sha256,
            });
            new_apks.push(apk);
        }

        // 3. Disable old targeting, using the ETags from the snapshot
        let phase = PublishPhase::DisableOldTargeting;
        info!(phase = %phase, "Removing targeting for old APK(s) in edit");
        for (apk, rules) in &snapshot {
            targeting
                .set(&edit.id, &apk.id, &disable_targeting(rules))
                .await
                .map_err(|e| e.in_phase(phase))?;
        }

        // 4. Apply old targeting to new APKs, by position
        let phase = PublishPhase::MigrateTargeting;
        info!(phase = %phase, "Setting targeting for new APK(s) in edit");
        for ((old, rules), new) in snapshot.iter().zip(&new_apks) {
            let current = targeting
                .get(&edit.id, &new.id)
                .await
                .map_err(|e| e.in_phase(phase))?;
            let migrated = rules.clone().with_etag(current.etag);

            debug!(from = %old.id, to = %new.id, "Migrating targeting");
            targeting
                .set(&edit.id, &new.id, &migrated)
                .await
                .map_err(|e| e.in_phase(phase))?;
        }

        // 5. Delete old APKs
        let phase = PublishPhase::DeleteOld;
        info!(phase = %phase, "Removing old APK(s) from edit");
        for (apk, _) in &snapshot {
            apks.delete(&edit.id, &apk.id)
                .await
                .map_err(|e| e.in_phase(phase))?;
            report.removed_apks.push(apk.id.clone());
        }

        Ok(())
    }
}
