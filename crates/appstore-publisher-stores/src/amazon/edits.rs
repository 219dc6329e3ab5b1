//! Edit lifecycle

use tracing::info;

use crate::error::{Result, StoreError};
use crate::traits::AppstoreApi;
use crate::types::Edit;

/// Edit resource client
pub struct EditService<'a, A: AppstoreApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: AppstoreApi + ?Sized> EditService<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// The active edit, if any
    pub async fn active(&self) -> Result<Option<Edit>> {
        let edit = self
            .api
            .get_active_edit()
            .await?
            .filter(|e| !e.id.trim().is_empty());
        Ok(edit)
    }

    /// Create a new edit
    pub async fn create(&self) -> Result<Edit> {
        info!("Creating new edit");
        self.api.create_edit().await
    }

    /// Delete an edit using the ETag it was read with
    pub async fn delete(&self, edit: &Edit) -> Result<()> {
        if edit.etag.is_empty() {
            return Err(StoreError::MissingEtag(format!("edit {}", edit.id)));
        }
        info!(edit_id = %edit.id, "Deleting edit");
        self.api.delete_edit(&edit.id, &edit.etag).await
    }

    /// The active edit, creating one when there is none
    pub async fn active_or_create(&self) -> Result<(Edit, bool)> {
        match self.active().await? {
            Some(edit) => Ok((edit, false)),
            None => Ok((self.create().await?, true)),
        }
    }
}
