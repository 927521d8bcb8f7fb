use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::RecalculationConfig;
use crate::recalculation::auth::{AuthError, RoleDirectory, ADMIN_ROLE};
use crate::recalculation::domain::{
    AssessmentId, AuditEntry, BulkOperation, ListFilter, RecalculationItem, StoredAssessment,
};
use crate::recalculation::repository::{
    AssessmentStore, OperationLog, ProfileWrite, StoreError, StoredPage,
};
use crate::recalculation::{recalculation_router, RecalculationService};

pub(super) const ADMIN_TOKEN: &str = "admin-token";
pub(super) const MEMBER_TOKEN: &str = "member-token";
pub(super) const ADMIN_USER: &str = "user-admin";

pub(super) type MemoryService = RecalculationService<MemoryStore, MemoryOperations, StaticDirectory>;

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn assessment_id(index: usize) -> AssessmentId {
    AssessmentId(format!("assessment-{index:04}"))
}

/// Higher indices are more recent.
pub(super) fn assessment(index: usize, variant: &str) -> StoredAssessment {
    StoredAssessment {
        id: assessment_id(index),
        responses: json!(vec![5; 108]),
        profile: Some(profile("v1", index)),
        user_id: format!("user-{index}"),
        variant: variant.to_string(),
        updated_at: epoch() + Duration::minutes(index as i64),
    }
}

pub(super) fn profile(version: &str, index: usize) -> Value {
    json!({ "mappings": { "mbti": "ISFJ" }, "version": version, "index": index })
}

pub(super) fn item(index: usize) -> RecalculationItem {
    RecalculationItem {
        id: assessment_id(index),
        old_profile: None,
        new_profile: profile("v2", index),
    }
}

pub(super) fn items(count: usize) -> Vec<RecalculationItem> {
    (0..count).map(item).collect()
}

pub(super) fn seeded_store(count: usize) -> Arc<MemoryStore> {
    let store = MemoryStore::default();
    for index in 0..count {
        store.insert(assessment(index, "standard"));
    }
    Arc::new(store)
}

pub(super) fn build_service(
    store: Arc<MemoryStore>,
) -> (MemoryService, Arc<MemoryStore>, Arc<MemoryOperations>) {
    let operations = Arc::new(MemoryOperations::default());
    let service = RecalculationService::new(
        store.clone(),
        operations.clone(),
        Arc::new(StaticDirectory::default()),
        RecalculationConfig::default(),
    );
    (service, store, operations)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    recalculation_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<BTreeMap<AssessmentId, StoredAssessment>>,
    batch_calls: Mutex<usize>,
}

impl MemoryStore {
    pub(super) fn insert(&self, assessment: StoredAssessment) {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .insert(assessment.id.clone(), assessment);
    }

    pub(super) fn profile_of(&self, id: &AssessmentId) -> Option<Value> {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .and_then(|row| row.profile.clone())
    }

    pub(super) fn batch_calls(&self) -> usize {
        *self.batch_calls.lock().expect("store mutex poisoned")
    }
}

fn check_write(
    rows: &BTreeMap<AssessmentId, StoredAssessment>,
    write: &ProfileWrite,
) -> Result<(), StoreError> {
    let row = rows
        .get(&write.id)
        .ok_or_else(|| StoreError::NotFound(write.id.clone()))?;
    match &write.expected {
        Some(expected) if row.profile.as_ref() != Some(expected) => {
            Err(StoreError::StaleProfile(write.id.clone()))
        }
        _ => Ok(()),
    }
}

fn apply_write(rows: &mut BTreeMap<AssessmentId, StoredAssessment>, write: &ProfileWrite) {
    if let Some(row) = rows.get_mut(&write.id) {
        row.profile = Some(write.profile.clone());
        row.updated_at = Utc::now();
    }
}

impl AssessmentStore for MemoryStore {
    fn list(
        &self,
        filter: &ListFilter,
        offset: usize,
        limit: usize,
    ) -> Result<StoredPage, StoreError> {
        let rows = self.rows.lock().expect("store mutex poisoned");
        let mut matching: Vec<&StoredAssessment> =
            rows.values().filter(|row| filter.matches(row)).collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(StoredPage {
            total: Some(matching.len()),
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    fn upsert_profiles(&self, writes: &[ProfileWrite]) -> Result<(), StoreError> {
        *self.batch_calls.lock().expect("store mutex poisoned") += 1;
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        for write in writes {
            check_write(&rows, write)?;
        }
        for write in writes {
            apply_write(&mut rows, write);
        }
        Ok(())
    }

    fn update_profile(&self, write: &ProfileWrite) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("store mutex poisoned");
        check_write(&rows, write)?;
        apply_write(&mut rows, write);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl AssessmentStore for UnavailableStore {
    fn list(&self, _: &ListFilter, _: usize, _: usize) -> Result<StoredPage, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn upsert_profiles(&self, _: &[ProfileWrite]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_profile(&self, _: &ProfileWrite) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Operation log that keeps every persisted revision so tests can observe progress.
#[derive(Default)]
pub(super) struct MemoryOperations {
    operations: Mutex<HashMap<Uuid, BulkOperation>>,
    revisions: Mutex<Vec<BulkOperation>>,
    audit: Mutex<Vec<AuditEntry>>,
}

impl MemoryOperations {
    pub(super) fn get(&self, id: Uuid) -> BulkOperation {
        self.operations
            .lock()
            .expect("operations mutex poisoned")
            .get(&id)
            .cloned()
            .expect("operation recorded")
    }

    pub(super) fn revisions(&self) -> Vec<BulkOperation> {
        self.revisions
            .lock()
            .expect("operations mutex poisoned")
            .clone()
    }

    pub(super) fn audit(&self) -> Vec<AuditEntry> {
        self.audit.lock().expect("audit mutex poisoned").clone()
    }
}

impl OperationLog for MemoryOperations {
    fn create(&self, operation: BulkOperation) -> Result<BulkOperation, StoreError> {
        self.operations
            .lock()
            .expect("operations mutex poisoned")
            .insert(operation.id, operation.clone());
        self.revisions
            .lock()
            .expect("operations mutex poisoned")
            .push(operation.clone());
        Ok(operation)
    }

    fn update(&self, operation: &BulkOperation) -> Result<(), StoreError> {
        let mut guard = self.operations.lock().expect("operations mutex poisoned");
        if !guard.contains_key(&operation.id) {
            return Err(StoreError::Conflict(format!(
                "operation {} does not exist",
                operation.id
            )));
        }
        guard.insert(operation.id, operation.clone());
        self.revisions
            .lock()
            .expect("operations mutex poisoned")
            .push(operation.clone());
        Ok(())
    }

    fn fetch(&self, id: Uuid) -> Result<Option<BulkOperation>, StoreError> {
        Ok(self
            .operations
            .lock()
            .expect("operations mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.audit.lock().expect("audit mutex poisoned").push(entry);
        Ok(())
    }
}

/// Admin and member sessions with a working role check.
#[derive(Default)]
pub(super) struct StaticDirectory;

impl RoleDirectory for StaticDirectory {
    fn resolve_session(&self, token: &str) -> Result<Option<String>, AuthError> {
        Ok(match token {
            ADMIN_TOKEN => Some(ADMIN_USER.to_string()),
            MEMBER_TOKEN => Some("user-member".to_string()),
            _ => None,
        })
    }

    fn has_role(&self, user_id: &str, role: &str) -> Result<bool, AuthError> {
        Ok(user_id == ADMIN_USER && role == ADMIN_ROLE)
    }

    fn roles(&self, user_id: &str) -> Result<Vec<String>, AuthError> {
        Ok(if user_id == ADMIN_USER {
            vec![ADMIN_ROLE.to_string()]
        } else {
            Vec::new()
        })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
