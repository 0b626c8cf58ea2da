//! # SyncJob Repository
//!
//! Queue operations for the sync_jobs table. All lifecycle transitions are
//! expressed as conditional `UPDATE ... WHERE status = ...` statements so
//! concurrent writers (API handlers and the worker) can never corrupt the
//! state machine: whoever loses the race simply affects zero rows.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{ApiError, invalid_state, not_found, validation_error};
use crate::models::sync_job::{ActiveModel, Column, Entity, Model};
use crate::sync::{JobParams, JobStatus, JobType, SyncOutcome};

/// Repository for sync job queue operations
pub struct SyncJobRepository {
    db: DatabaseConnection,
}

impl SyncJobRepository {
    /// Create a new SyncJobRepository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enqueue a new sync job in `pending` state.
    ///
    /// Params are validated against the job type's schema before anything is
    /// written; the stored payload is never mutated afterwards.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        job_type: JobType,
        params: JsonValue,
    ) -> Result<Model, ApiError> {
        JobParams::decode(job_type, &params).map_err(|err| {
            validation_error(
                "Invalid job parameters",
                serde_json::json!({ "params": err.to_string() }),
            )
        })?;

        let now = Utc::now().fixed_offset();

        let job = ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            job_type: Set(job_type.as_str().to_string()),
            status: Set(JobStatus::Pending.as_str().to_string()),
            params: Set(params),
            result: Set(None),
            error_message: Set(None),
            progress: Set(0),
            total_records: Set(-1),
            processed_records: Set(0),
            created_at: Set(now),
            started_at: Set(None),
            completed_at: Set(None),
        };

        let created = job.insert(&self.db).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            job_id = %created.id,
            job_type = %job_type,
            "Sync job enqueued"
        );

        Ok(created)
    }

    /// Find a sync job by ID, ensuring it belongs to the specified tenant
    pub async fn find_by_tenant(
        &self,
        tenant_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Model>, ApiError> {
        let job = Entity::find_by_id(job_id)
            .filter(Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?;

        Ok(job)
    }

    /// List sync jobs for a tenant, newest first, with optional filtering
    pub async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        job_type: Option<JobType>,
        status: Option<JobStatus>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<Model>, ApiError> {
        let mut query = Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .order_by_desc(Column::CreatedAt);

        if let Some(job_type) = job_type {
            query = query.filter(Column::JobType.eq(job_type.as_str()));
        }

        if let Some(status) = status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let results = query
            .offset(offset.unwrap_or(0))
            .limit(limit.unwrap_or(50))
            .all(&self.db)
            .await?;

        Ok(results)
    }

    /// Atomically claim up to `batch_size` pending jobs, oldest first,
    /// moving them to `processing` and stamping `started_at`.
    ///
    /// Jobs canceled between the candidate scan and the claiming UPDATE are
    /// left untouched and excluded from the returned batch.
    pub async fn claim_batch(&self, batch_size: u64) -> Result<Vec<Model>, DbErr> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let candidate_ids = Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Status.eq(JobStatus::Pending.as_str()))
            .order_by_asc(Column::CreatedAt)
            .limit(batch_size)
            .into_tuple::<Uuid>()
            .all(&txn)
            .await?;

        if candidate_ids.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Processing.as_str()))
            .col_expr(Column::StartedAt, Expr::value(now))
            .filter(Column::Id.is_in(candidate_ids.clone()))
            .filter(Column::Status.eq(JobStatus::Pending.as_str()))
            .exec(&txn)
            .await?;

        // Re-select only the rows this claimer flipped, keyed on its own
        // started_at stamp. A rival claimer that won the same candidates
        // leaves rows_affected at zero here, and its rows carry a different
        // stamp, so a job is never handed to two workers.
        let claimed = if update.rows_affected > 0 {
            Entity::find()
                .filter(Column::Id.is_in(candidate_ids))
                .filter(Column::Status.eq(JobStatus::Processing.as_str()))
                .filter(Column::StartedAt.eq(now))
                .order_by_asc(Column::CreatedAt)
                .all(&txn)
                .await?
        } else {
            Vec::new()
        };

        txn.commit().await?;

        Ok(claimed)
    }

    /// Record progress on a processing job.
    ///
    /// Progress is monotonically non-decreasing; stale or out-of-order
    /// updates affect zero rows. A job canceled mid-run stops accepting
    /// updates the same way.
    pub async fn update_progress(
        &self,
        job_id: Uuid,
        progress: i32,
        processed_records: i32,
        total_records: i32,
    ) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::Progress, Expr::value(progress.clamp(0, 100)))
            .col_expr(Column::ProcessedRecords, Expr::value(processed_records))
            .col_expr(Column::TotalRecords, Expr::value(total_records))
            .filter(Column::Id.eq(job_id))
            .filter(Column::Status.eq(JobStatus::Processing.as_str()))
            .filter(Column::Progress.lte(progress))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Transition a processing job to `completed`, persisting its outcome.
    ///
    /// Returns false when the job was not in `processing` (e.g. raced with a
    /// cancelation), in which case nothing is written.
    pub async fn complete(&self, job_id: Uuid, outcome: &SyncOutcome) -> Result<bool, DbErr> {
        let now = Utc::now().fixed_offset();
        let result_json = serde_json::to_value(outcome)
            .map_err(|err| DbErr::Custom(format!("failed to serialize sync outcome: {}", err)))?;

        let update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Completed.as_str()))
            .col_expr(Column::Result, Expr::value(result_json))
            .col_expr(Column::Progress, Expr::value(100))
            .col_expr(Column::TotalRecords, Expr::value(outcome.total as i32))
            .col_expr(Column::ProcessedRecords, Expr::value(outcome.total as i32))
            .col_expr(Column::CompletedAt, Expr::value(now))
            .filter(Column::Id.eq(job_id))
            .filter(Column::Status.eq(JobStatus::Processing.as_str()))
            .exec(&self.db)
            .await?;

        Ok(update.rows_affected > 0)
    }

    /// Transition a processing job to `failed` with an operator-readable
    /// error message. Returns false when the job was not in `processing`.
    pub async fn fail(&self, job_id: Uuid, error_message: &str) -> Result<bool, DbErr> {
        let now = Utc::now().fixed_offset();

        let update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Failed.as_str()))
            .col_expr(Column::ErrorMessage, Expr::value(error_message))
            .col_expr(Column::CompletedAt, Expr::value(now))
            .filter(Column::Id.eq(job_id))
            .filter(Column::Status.eq(JobStatus::Processing.as_str()))
            .exec(&self.db)
            .await?;

        Ok(update.rows_affected > 0)
    }

    /// Reset a failed job back to `pending` so the worker picks it up again.
    ///
    /// The original params are kept; outcome, error, progress, and
    /// timestamps from the failed attempt are cleared.
    pub async fn retry(&self, tenant_id: Uuid, job_id: Uuid) -> Result<Model, ApiError> {
        let update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Pending.as_str()))
            .col_expr(Column::ErrorMessage, Expr::value(Option::<String>::None))
            .col_expr(Column::Result, Expr::value(Option::<JsonValue>::None))
            .col_expr(Column::Progress, Expr::value(0))
            .col_expr(Column::TotalRecords, Expr::value(-1))
            .col_expr(Column::ProcessedRecords, Expr::value(0))
            .col_expr(
                Column::StartedAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .col_expr(
                Column::CompletedAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .filter(Column::Id.eq(job_id))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Status.eq(JobStatus::Failed.as_str()))
            .exec(&self.db)
            .await?;

        if update.rows_affected == 0 {
            return match self.find_by_tenant(tenant_id, job_id).await? {
                None => Err(not_found("Sync job not found")),
                Some(job) => Err(invalid_state(&format!(
                    "only failed jobs can be retried, job is '{}'",
                    job.status
                ))),
            };
        }

        tracing::info!(tenant_id = %tenant_id, job_id = %job_id, "Sync job requeued for retry");

        self.find_by_tenant(tenant_id, job_id)
            .await?
            .ok_or_else(|| not_found("Sync job not found"))
    }

    /// Cancel a pending job. Jobs that already started cannot be canceled.
    pub async fn cancel(&self, tenant_id: Uuid, job_id: Uuid) -> Result<Model, ApiError> {
        let now = Utc::now().fixed_offset();

        let update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(JobStatus::Canceled.as_str()))
            .col_expr(Column::CompletedAt, Expr::value(now))
            .filter(Column::Id.eq(job_id))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Status.eq(JobStatus::Pending.as_str()))
            .exec(&self.db)
            .await?;

        if update.rows_affected == 0 {
            return match self.find_by_tenant(tenant_id, job_id).await? {
                None => Err(not_found("Sync job not found")),
                Some(job) => Err(invalid_state(&format!(
                    "only pending jobs can be canceled, job is '{}'",
                    job.status
                ))),
            };
        }

        tracing::info!(tenant_id = %tenant_id, job_id = %job_id, "Sync job canceled");

        self.find_by_tenant(tenant_id, job_id)
            .await?
            .ok_or_else(|| not_found("Sync job not found"))
    }
}
