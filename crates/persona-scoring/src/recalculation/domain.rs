use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of a stored assessment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A completed assessment as held by the assessment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub id: AssessmentId,
    pub responses: Value,
    pub profile: Option<Value>,
    pub user_id: String,
    pub variant: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilter {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub variant: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, assessment: &StoredAssessment) -> bool {
        self.since
            .map(|since| assessment.updated_at >= since)
            .unwrap_or(true)
            && self
                .variant
                .as_deref()
                .map(|variant| assessment.variant == variant)
                .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub filter: Option<ListFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<StoredAssessment>,
    pub total: Option<usize>,
    /// `None` once a page comes back shorter than the limit.
    pub next_offset: Option<usize>,
}

/// A recomputed profile submitted for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationItem {
    pub id: AssessmentId,
    #[serde(default)]
    pub old_profile: Option<Value>,
    pub new_profile: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub items: Vec<RecalculationItem>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub operation_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub id: AssessmentId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub operation_id: Uuid,
    pub success: usize,
    pub errors: Vec<ItemError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    DryRun,
    Processing,
    Completed,
}

/// Progress record for one recalculation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOperation {
    pub id: Uuid,
    pub status: BulkStatus,
    pub total_items: usize,
    pub processed_items: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub error_details: Vec<ItemError>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BulkOperation {
    pub fn start(created_by: &str, total_items: usize, status: BulkStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status,
            total_items,
            processed_items: 0,
            success_count: 0,
            error_count: 0,
            error_details: Vec::new(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub(crate) fn record_chunk(&mut self, processed: usize, succeeded: usize, errors: &[ItemError]) {
        self.processed_items += processed;
        self.success_count += succeeded;
        self.error_count += errors.len();
        self.error_details.extend_from_slice(errors);
        self.updated_at = Utc::now();
    }

    pub(crate) fn complete(&mut self) {
        let now = Utc::now();
        self.status = BulkStatus::Completed;
        self.updated_at = now;
        self.completed_at = Some(now);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: String,
    pub action: String,
    pub operation_id: Uuid,
    pub details: Value,
    pub recorded_at: DateTime<Utc>,
}
