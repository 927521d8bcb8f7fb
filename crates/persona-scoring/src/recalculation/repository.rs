use serde_json::Value;
use uuid::Uuid;

use super::domain::{AssessmentId, AuditEntry, BulkOperation, ListFilter, StoredAssessment};

/// Replacement of one assessment's whole profile. When `expected` is set the write only
/// lands if the stored profile still equals it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileWrite {
    pub id: AssessmentId,
    pub expected: Option<Value>,
    pub profile: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub items: Vec<StoredAssessment>,
    pub total: Option<usize>,
}

/// Assessment table access. Listing is newest first by `updated_at`.
pub trait AssessmentStore: Send + Sync {
    fn list(
        &self,
        filter: &ListFilter,
        offset: usize,
        limit: usize,
    ) -> Result<StoredPage, StoreError>;

    /// Applies every write in one transaction: either all land or none do.
    fn upsert_profiles(&self, writes: &[ProfileWrite]) -> Result<(), StoreError>;

    fn update_profile(&self, write: &ProfileWrite) -> Result<(), StoreError>;
}

/// Bulk operation records and the admin audit trail.
pub trait OperationLog: Send + Sync {
    fn create(&self, operation: BulkOperation) -> Result<BulkOperation, StoreError>;
    fn update(&self, operation: &BulkOperation) -> Result<(), StoreError>;
    fn fetch(&self, id: Uuid) -> Result<Option<BulkOperation>, StoreError>;
    fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),
    #[error("assessment {0} was modified since its profile was read")]
    StaleProfile(AssessmentId),
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
