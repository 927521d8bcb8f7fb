//! Bulk recalculation: admins page through stored assessments, recompute profiles against
//! the active overrides, and write them back in chunks with progress and an audit trail.

pub mod auth;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use auth::{authorize_admin, bearer_token, AuthError, RoleDirectory, ADMIN_ROLE};
pub use domain::{
    ApplyOutcome, ApplyRequest, AssessmentId, AuditEntry, BulkOperation, BulkStatus, ItemError,
    ListFilter, ListPage, ListRequest, RecalculationItem, StoredAssessment,
};
pub use repository::{AssessmentStore, OperationLog, ProfileWrite, StoreError, StoredPage};
pub use router::recalculation_router;
pub use service::{RecalculationError, RecalculationService};
