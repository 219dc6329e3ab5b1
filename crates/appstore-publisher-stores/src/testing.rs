//! In-memory Appstore used by unit tests
//!
//! Enforces `If-Match` like the real service and records every call in order.

use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::traits::AppstoreApi;
use crate::types::*;

/// A call received by [`FakeAppstore`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetActiveEdit,
    CreateEdit,
    DeleteEdit { edit_id: String, etag: String },
    ListApks,
    GetApk { apk_id: String },
    UploadApk { filename: String },
    UploadLargeApk { filename: String },
    AttachApk { reference: String },
    ReplaceApk { apk_id: String, etag: String },
    DeleteApk { apk_id: String, etag: String },
    /// `etag` is what was returned, `None` if the call failed
    GetTargeting { apk_id: String, etag: Option<String> },
    SetTargeting {
        apk_id: String,
        etag: String,
        targeting: ApkTargeting,
    },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateEdit
                | Call::DeleteEdit { .. }
                | Call::UploadApk { .. }
                | Call::UploadLargeApk { .. }
                | Call::AttachApk { .. }
                | Call::ReplaceApk { .. }
                | Call::DeleteApk { .. }
                | Call::SetTargeting { .. }
        )
    }

    pub fn is_targeting(&self) -> bool {
        matches!(self, Call::GetTargeting { .. } | Call::SetTargeting { .. })
    }
}

struct StoredApk {
    apk: Apk,
    targeting: ApkTargeting,
    content: String,
}

struct State {
    edit: Option<Edit>,
    apks: Vec<StoredApk>,
    pending_large: Vec<(String, ApkPayload)>,
    counter: u32,
    calls: Vec<Call>,
}

impl State {
    fn next(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    fn etag(&mut self) -> String {
        format!("\"etag-{}\"", self.next())
    }

    fn find(&mut self, apk_id: &str) -> Result<&mut StoredApk> {
        self.apks
            .iter_mut()
            .find(|s| s.apk.id == apk_id)
            .ok_or_else(|| not_found(apk_id))
    }

    fn check_edit(&self, edit_id: &str) -> Result<()> {
        match &self.edit {
            Some(edit) if edit.id == edit_id => Ok(()),
            _ => Err(not_found(edit_id)),
        }
    }

    fn store_new(&mut self, payload: &ApkPayload) -> Apk {
        let n = self.next();
        let apk = Apk {
            version_code: 1000 + n as i64,
            id: format!("new-{}", n),
            name: payload.filename.clone(),
            etag: self.etag(),
        };
        let targeting = ApkTargeting {
            amazon_devices: vec![device("fresh-device", TargetingStatus::Targeting)],
            non_amazon_devices: Vec::new(),
            other_android_devices: Some("ALL".to_string()),
            etag: self.etag(),
        };
        self.apks.push(StoredApk {
            apk: apk.clone(),
            targeting,
            content: payload.sha256.clone(),
        });
        apk
    }
}

type FailurePredicate = Box<dyn Fn(&Call) -> bool + Send + Sync>;

/// In-memory stand-in for the Appstore API
pub struct FakeAppstore {
    state: Mutex<State>,
    fail_when: Option<FailurePredicate>,
}

pub fn device(id: &str, status: TargetingStatus) -> Device {
    Device {
        id: id.to_string(),
        name: format!("{} name", id),
        status,
        reason: None,
    }
}

pub fn targeting(devices: Vec<Device>, other: &str) -> ApkTargeting {
    ApkTargeting {
        amazon_devices: devices,
        non_amazon_devices: Vec::new(),
        other_android_devices: Some(other.to_string()),
        etag: String::new(),
    }
}

fn not_found(what: &str) -> StoreError {
    StoreError::ApiError {
        status: 404,
        message: format!("{} not found", what),
    }
}

fn precondition_failed(expected: &str, got: &str) -> StoreError {
    StoreError::ApiError {
        status: 412,
        message: format!("If-Match {} does not match {}", got, expected),
    }
}

impl FakeAppstore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                edit: None,
                apks: Vec::new(),
                pending_large: Vec::new(),
                counter: 0,
                calls: Vec::new(),
            }),
            fail_when: None,
        }
    }

    /// Start with an active edit
    pub fn with_edit(self, edit_id: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let etag = state.etag();
            state.edit = Some(Edit {
                id: edit_id.to_string(),
                status: Some("IN_PROGRESS".to_string()),
                etag,
            });
        }
        self
    }

    /// Start with an APK on the edit
    pub fn with_apk(self, apk_id: &str, version_code: i64, rules: ApkTargeting) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let apk = Apk {
                version_code,
                id: apk_id.to_string(),
                name: format!("{}.apk", apk_id),
                etag: state.etag(),
            };
            let rules = rules.with_etag(state.etag());
            state.apks.push(StoredApk {
                apk,
                targeting: rules,
                content: String::new(),
            });
        }
        self
    }

    /// Fail every call matching the predicate with a 500
    pub fn fail_when(mut self, predicate: impl Fn(&Call) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn apk_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.apks.iter().map(|s| s.apk.id.clone()).collect()
    }

    pub fn targeting_of(&self, apk_id: &str) -> ApkTargeting {
        let state = self.state.lock().unwrap();
        state
            .apks
            .iter()
            .find(|s| s.apk.id == apk_id)
            .map(|s| s.targeting.clone())
            .expect("unknown APK")
    }

    pub fn content_of(&self, apk_id: &str) -> String {
        let state = self.state.lock().unwrap();
        state
            .apks
            .iter()
            .find(|s| s.apk.id == apk_id)
            .map(|s| s.content.clone())
            .expect("unknown APK")
    }

    pub fn edit(&self) -> Option<Edit> {
        self.state.lock().unwrap().edit.clone()
    }

    /// Record a call and apply the failure predicate
    fn record(&self, state: &mut State, call: Call) -> Result<()> {
        let failed = self.fail_when.as_ref().is_some_and(|f| f(&call));
        state.calls.push(call);
        if failed {
            return Err(StoreError::ApiError {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AppstoreApi for FakeAppstore {
    async fn get_active_edit(&self) -> Result<Option<Edit>> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::GetActiveEdit)?;
        Ok(state.edit.clone())
    }

    async fn create_edit(&self) -> Result<Edit> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::CreateEdit)?;
        let n = state.next();
        let edit = Edit {
            id: format!("edit-{}", n),
            status: Some("IN_PROGRESS".to_string()),
            etag: state.etag(),
        };
        state.edit = Some(edit.clone());
        Ok(edit)
    }

    async fn delete_edit(&self, edit_id: &str, etag: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::DeleteEdit {
                edit_id: edit_id.to_string(),
                etag: etag.to_string(),
            },
        )?;
        state.check_edit(edit_id)?;
        let current = state.edit.as_ref().map(|e| e.etag.clone()).unwrap_or_default();
        if current != etag {
            return Err(precondition_failed(&current, etag));
        }
        state.edit = None;
        Ok(())
    }

    async fn list_apks(&self, edit_id: &str) -> Result<Vec<Apk>> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, Call::ListApks)?;
        state.check_edit(edit_id)?;
        Ok(state
            .apks
            .iter()
            .map(|s| Apk {
                etag: String::new(),
                ..s.apk.clone()
            })
            .collect())
    }

    async fn get_apk(&self, edit_id: &str, apk_id: &str) -> Result<Apk> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::GetApk {
                apk_id: apk_id.to_string(),
            },
        )?;
        state.check_edit(edit_id)?;
        Ok(state.find(apk_id)?.apk.clone())
    }

    async fn upload_apk(&self, edit_id: &str, payload: ApkPayload) -> Result<Apk> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::UploadApk {
                filename: payload.filename.clone(),
            },
        )?;
        state.check_edit(edit_id)?;
        Ok(state.store_new(&payload))
    }

    async fn upload_large_apk(
        &self,
        edit_id: &str,
        payload: ApkPayload,
    ) -> Result<LargeUploadReference> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::UploadLargeApk {
                filename: payload.filename.clone(),
            },
        )?;
        state.check_edit(edit_id)?;
        let reference = format!("{{\"fileId\":\"file-{}\"}}", state.next());
        state.pending_large.push((reference.clone(), payload));
        Ok(LargeUploadReference(reference))
    }

    async fn attach_apk(&self, edit_id: &str, reference: &LargeUploadReference) -> Result<Apk> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::AttachApk {
                reference: reference.as_str().to_string(),
            },
        )?;
        state.check_edit(edit_id)?;
        let position = state
            .pending_large
            .iter()
            .position(|(r, _)| r == reference.as_str())
            .ok_or_else(|| not_found(reference.as_str()))?;
        let (_, payload) = state.pending_large.remove(position);
        Ok(state.store_new(&payload))
    }

    async fn replace_apk(
        &self,
        edit_id: &str,
        apk_id: &str,
        etag: &str,
        payload: ApkPayload,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::ReplaceApk {
                apk_id: apk_id.to_string(),
                etag: etag.to_string(),
            },
        )?;
        state.check_edit(edit_id)?;
        let new_etag = state.etag();
        let stored = state.find(apk_id)?;
        if stored.apk.etag != etag {
            return Err(precondition_failed(&stored.apk.etag, etag));
        }
        stored.apk.etag = new_etag;
        stored.apk.name = payload.filename.clone();
        stored.content = payload.sha256;
        Ok(())
    }

    async fn delete_apk(&self, edit_id: &str, apk_id: &str, etag: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::DeleteApk {
                apk_id: apk_id.to_string(),
                etag: etag.to_string(),
            },
        )?;
        state.check_edit(edit_id)?;
        let stored = state.find(apk_id)?;
        if stored.apk.etag != etag {
            return Err(precondition_failed(&stored.apk.etag, etag));
        }
        state.apks.retain(|s| s.apk.id != apk_id);
        Ok(())
    }

    async fn get_targeting(&self, edit_id: &str, apk_id: &str) -> Result<ApkTargeting> {
        let mut state = self.state.lock().unwrap();
        let found = state
            .edit
            .as_ref()
            .filter(|e| e.id == edit_id)
            .and_then(|_| state.apks.iter().find(|s| s.apk.id == apk_id))
            .map(|s| s.targeting.clone());
        let failed = self.fail_when.as_ref().is_some_and(|f| {
            f(&Call::GetTargeting {
                apk_id: apk_id.to_string(),
                etag: None,
            })
        });
        let returned = if failed { None } else { found.clone() };
        self.record(
            &mut state,
            Call::GetTargeting {
                apk_id: apk_id.to_string(),
                etag: returned.as_ref().map(|t| t.etag.clone()),
            },
        )?;
        if failed {
            return Err(StoreError::ApiError {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        found.ok_or_else(|| not_found(apk_id))
    }

    async fn set_targeting(
        &self,
        edit_id: &str,
        apk_id: &str,
        targeting: &ApkTargeting,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.record(
            &mut state,
            Call::SetTargeting {
                apk_id: apk_id.to_string(),
                etag: targeting.etag.clone(),
                targeting: targeting.clone(),
            },
        )?;
        state.check_edit(edit_id)?;
        let new_etag = state.etag();
        let stored = state.find(apk_id)?;
        if stored.targeting.etag != targeting.etag {
            return Err(precondition_failed(&stored.targeting.etag, &targeting.etag));
        }
        stored.targeting = targeting.clone().with_etag(new_etag);
        Ok(())
    }
}
