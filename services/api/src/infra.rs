use metrics_exporter_prometheus::PrometheusHandle;
use persona_scoring::config::ScoringConfig;
use persona_scoring::error::AppError;
use persona_scoring::recalculation::{
    AssessmentId, AssessmentStore, AuditEntry, AuthError, BulkOperation, ListFilter,
    OperationLog, ProfileWrite, RoleDirectory, StoreError, StoredAssessment, StoredPage,
    ADMIN_ROLE,
};
use persona_scoring::{ScoringEngine, ScoringOverrides};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<ScoringEngine>,
    pub(crate) assessments: Arc<InMemoryAssessmentStore>,
    pub(crate) directory: Arc<StaticRoleDirectory>,
}

/// Active overrides: the configured document when one is set, otherwise the built-in tables.
pub(crate) fn load_overrides(config: &ScoringConfig) -> Result<ScoringOverrides, AppError> {
    let Some(path) = config.overrides_path.as_deref() else {
        return Ok(ScoringOverrides::default());
    };
    let (overrides, report) = ScoringOverrides::load_validated(path)?;
    for warning in &report.warnings {
        warn!(path = %path.display(), %warning, "scoring overrides warning");
    }
    info!(path = %path.display(), "scoring overrides activated");
    Ok(overrides)
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default)]
pub(crate) struct InMemoryAssessmentStore {
    rows: Mutex<BTreeMap<AssessmentId, StoredAssessment>>,
}

impl InMemoryAssessmentStore {
    pub(crate) fn insert(&self, assessment: StoredAssessment) -> Result<(), StoreError> {
        let mut rows = lock(&self.rows)?;
        if rows.contains_key(&assessment.id) {
            return Err(StoreError::Conflict(format!(
                "assessment {} already exists",
                assessment.id
            )));
        }
        rows.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn check(
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

    fn write(rows: &mut BTreeMap<AssessmentId, StoredAssessment>, write: &ProfileWrite) {
        if let Some(row) = rows.get_mut(&write.id) {
            row.profile = Some(write.profile.clone());
            row.updated_at = chrono::Utc::now();
        }
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn list(
        &self,
        filter: &ListFilter,
        offset: usize,
        limit: usize,
    ) -> Result<StoredPage, StoreError> {
        let rows = lock(&self.rows)?;
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
        let mut rows = lock(&self.rows)?;
        for write in writes {
            Self::check(&rows, write)?;
        }
        for write in writes {
            Self::write(&mut rows, write);
        }
        Ok(())
    }

    fn update_profile(&self, write: &ProfileWrite) -> Result<(), StoreError> {
        let mut rows = lock(&self.rows)?;
        Self::check(&rows, write)?;
        Self::write(&mut rows, write);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryOperationLog {
    operations: Mutex<HashMap<Uuid, BulkOperation>>,
    audit: Mutex<Vec<AuditEntry>>,
}

impl InMemoryOperationLog {
    #[cfg(test)]
    pub(crate) fn audit_len(&self) -> usize {
        self.audit.lock().map(|audit| audit.len()).unwrap_or(0)
    }
}

impl OperationLog for InMemoryOperationLog {
    fn create(&self, operation: BulkOperation) -> Result<BulkOperation, StoreError> {
        lock(&self.operations)?.insert(operation.id, operation.clone());
        Ok(operation)
    }

    fn update(&self, operation: &BulkOperation) -> Result<(), StoreError> {
        let mut operations = lock(&self.operations)?;
        match operations.get_mut(&operation.id) {
            Some(existing) => {
                *existing = operation.clone();
                Ok(())
            }
            None => Err(StoreError::Conflict(format!(
                "bulk operation {} does not exist",
                operation.id
            ))),
        }
    }

    fn fetch(&self, id: Uuid) -> Result<Option<BulkOperation>, StoreError> {
        Ok(lock(&self.operations)?.get(&id).cloned())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        info!(
            actor = %entry.actor,
            action = %entry.action,
            operation_id = %entry.operation_id,
            "audit entry recorded"
        );
        lock(&self.audit)?.push(entry);
        Ok(())
    }
}

/// Sessions from `APP_ADMIN_TOKENS`; every configured token belongs to an admin.
#[derive(Debug, Default, Clone)]
pub(crate) struct StaticRoleDirectory {
    sessions: BTreeMap<String, String>,
}

impl StaticRoleDirectory {
    pub(crate) fn new(admin_tokens: BTreeMap<String, String>) -> Self {
        Self {
            sessions: admin_tokens,
        }
    }

    fn is_admin(&self, user_id: &str) -> bool {
        self.sessions.values().any(|admin| admin == user_id)
    }
}

impl RoleDirectory for StaticRoleDirectory {
    fn resolve_session(&self, token: &str) -> Result<Option<String>, AuthError> {
        Ok(self.sessions.get(token).cloned())
    }

    fn has_role(&self, user_id: &str, role: &str) -> Result<bool, AuthError> {
        Ok(role == ADMIN_ROLE && self.is_admin(user_id))
    }

    fn roles(&self, user_id: &str) -> Result<Vec<String>, AuthError> {
        Ok(if self.is_admin(user_id) {
            vec![ADMIN_ROLE.to_string()]
        } else {
            Vec::new()
        })
    }
}
