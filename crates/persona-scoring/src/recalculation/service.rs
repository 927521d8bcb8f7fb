use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::auth::{authorize_admin, AuthError, RoleDirectory};
use super::domain::{
    ApplyOutcome, ApplyRequest, AuditEntry, BulkOperation, BulkStatus, ItemError, ListPage,
    ListRequest,
};
use super::repository::{AssessmentStore, OperationLog, ProfileWrite, StoreError};
use crate::config::RecalculationConfig;

pub const AUDIT_ACTION: &str = "bulk_recalculate";
pub const AUDIT_ACTION_DRY_RUN: &str = "bulk_recalculate_dry_run";

/// Admin-only list/apply protocol for re-scoring stored assessments in bounded chunks.
pub struct RecalculationService<S, O, D> {
    store: Arc<S>,
    operations: Arc<O>,
    directory: Arc<D>,
    config: RecalculationConfig,
}

impl<S, O, D> RecalculationService<S, O, D>
where
    S: AssessmentStore + 'static,
    O: OperationLog + 'static,
    D: RoleDirectory + 'static,
{
    pub fn new(
        store: Arc<S>,
        operations: Arc<O>,
        directory: Arc<D>,
        config: RecalculationConfig,
    ) -> Self {
        Self {
            store,
            operations,
            directory,
            config,
        }
    }

    /// User id of the calling admin.
    pub fn authorize(&self, token: Option<&str>) -> Result<String, RecalculationError> {
        Ok(authorize_admin(self.directory.as_ref(), token)?)
    }

    pub fn list(&self, request: ListRequest) -> Result<ListPage, RecalculationError> {
        let offset = request.offset.unwrap_or(0);
        let limit = request
            .limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size.max(1));
        let filter = request.filter.unwrap_or_default();

        let page = self.store.list(&filter, offset, limit)?;
        let next_offset = if page.items.len() < limit {
            None
        } else {
            Some(offset + page.items.len())
        };

        Ok(ListPage {
            items: page.items,
            total: page.total,
            next_offset,
        })
    }

    pub fn apply(
        &self,
        actor: &str,
        request: ApplyRequest,
    ) -> Result<ApplyOutcome, RecalculationError> {
        if request.dry_run {
            return self.dry_run(actor, request);
        }

        let mut operation = match request.operation_id {
            Some(id) => {
                let mut operation = self
                    .operations
                    .fetch(id)?
                    .ok_or(RecalculationError::OperationNotFound(id))?;
                operation.status = BulkStatus::Processing;
                operation.total_items += request.items.len();
                operation.completed_at = None;
                self.operations.update(&operation)?;
                operation
            }
            None => self.operations.create(BulkOperation::start(
                actor,
                request.items.len(),
                BulkStatus::Processing,
            ))?,
        };

        info!(
            operation_id = %operation.id,
            items = request.items.len(),
            chunk_size = self.config.chunk_size,
            "bulk recalculation started"
        );

        let mut success = 0;
        let mut errors = Vec::new();
        for (index, chunk) in request
            .items
            .chunks(self.config.chunk_size.max(1))
            .enumerate()
        {
            let writes: Vec<ProfileWrite> = chunk
                .iter()
                .map(|item| ProfileWrite {
                    id: item.id.clone(),
                    expected: item.old_profile.clone(),
                    profile: item.new_profile.clone(),
                })
                .collect();

            let (succeeded, failed) = self.write_chunk(index, &writes);
            operation.record_chunk(writes.len(), succeeded, &failed);
            self.operations.update(&operation)?;

            success += succeeded;
            errors.extend(failed);
        }

        operation.complete();
        self.operations.update(&operation)?;
        self.audit(actor, AUDIT_ACTION, &operation, success, errors.len())?;

        info!(
            operation_id = %operation.id,
            success,
            errors = errors.len(),
            "bulk recalculation completed"
        );

        Ok(ApplyOutcome {
            operation_id: operation.id,
            success,
            errors,
        })
    }

    /// Writes one chunk, falling back to row-by-row updates when the batch write fails.
    fn write_chunk(&self, index: usize, writes: &[ProfileWrite]) -> (usize, Vec<ItemError>) {
        let error = match self.store.upsert_profiles(writes) {
            Ok(()) => return (writes.len(), Vec::new()),
            Err(error) => error,
        };
        warn!(chunk = index, %error, "chunk upsert failed, retrying rows individually");

        let mut succeeded = 0;
        let mut failed = Vec::new();
        for write in writes {
            match self.store.update_profile(write) {
                Ok(()) => succeeded += 1,
                Err(error) => {
                    warn!(assessment_id = %write.id, %error, "profile update failed");
                    failed.push(ItemError {
                        id: write.id.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }
        (succeeded, failed)
    }

    fn dry_run(&self, actor: &str, request: ApplyRequest) -> Result<ApplyOutcome, RecalculationError> {
        let operation = match request.operation_id {
            Some(id) => self
                .operations
                .fetch(id)?
                .ok_or(RecalculationError::OperationNotFound(id))?,
            None => self.operations.create(BulkOperation::start(
                actor,
                request.items.len(),
                BulkStatus::DryRun,
            ))?,
        };

        self.audit(actor, AUDIT_ACTION_DRY_RUN, &operation, 0, 0)?;
        info!(
            operation_id = %operation.id,
            items = request.items.len(),
            "bulk recalculation dry run recorded"
        );

        Ok(ApplyOutcome {
            operation_id: operation.id,
            success: 0,
            errors: Vec::new(),
        })
    }

    fn audit(
        &self,
        actor: &str,
        action: &str,
        operation: &BulkOperation,
        success: usize,
        errors: usize,
    ) -> Result<(), RecalculationError> {
        self.operations.append_audit(AuditEntry {
            id: Uuid::new_v4(),
            actor: actor.to_string(),
            action: action.to_string(),
            operation_id: operation.id,
            details: json!({
                "status": operation.status,
                "total_items": operation.total_items,
                "success": success,
                "errors": errors,
            }),
            recorded_at: Utc::now(),
        })?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecalculationError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("bulk operation not found")]
    OperationNotFound(Uuid),
}
