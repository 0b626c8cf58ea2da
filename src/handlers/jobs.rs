//! # Sync Job API Handlers
//!
//! Endpoints for enqueueing and managing sync jobs. All routes require
//! operator bearer auth plus the X-Tenant-Id header.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{OperatorAuth, TenantExtension};
use crate::error::{ApiError, not_found, validation_error};
use crate::models::sync_job;
use crate::repositories::SyncJobRepository;
use crate::server::AppState;
use crate::sync::{JobStatus, JobType};

/// Request payload for creating a sync job
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJobRequest {
    /// Kind of entity to sync
    #[schema(example = "absences")]
    pub job_type: JobType,
    /// Type-specific parameters; validated against the job type's schema
    #[schema(example = json!({ "start_date": "2026-01-01", "end_date": "2026-01-31" }))]
    pub params: Option<JsonValue>,
}

/// Query parameters for listing sync jobs
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    /// Filter by job status (pending, processing, completed, failed, canceled)
    pub status: Option<String>,
    /// Filter by job type (companies, employees, absences)
    pub job_type: Option<String>,
    /// Maximum number of jobs to return (default: 50, max: 100)
    pub limit: Option<u32>,
    /// Number of jobs to skip
    pub offset: Option<u32>,
}

/// Sync job response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobInfo {
    /// Unique identifier for the sync job
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,
    /// Kind of entity being synced
    #[schema(example = "companies")]
    pub job_type: String,
    /// Current lifecycle status
    #[schema(example = "pending")]
    pub status: String,
    /// Request parameters fixed at creation
    pub params: JsonValue,
    /// Outcome counters, present once the job completed
    pub result: Option<JsonValue>,
    /// Failure description, present once the job failed
    pub error_message: Option<String>,
    /// Completion percentage 0-100
    #[schema(example = 100)]
    pub progress: i32,
    /// Expected record count; -1 while unknown
    #[schema(example = 42)]
    pub total_records: i32,
    /// Records processed so far
    pub processed_records: i32,
    /// Timestamp when the job was created
    #[schema(example = "2026-01-15T10:30:00Z")]
    pub created_at: String,
    /// Timestamp when the worker claimed the job
    pub started_at: Option<String>,
    /// Timestamp when the job reached a terminal state
    pub completed_at: Option<String>,
}

/// Response payload for the jobs listing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobsResponse {
    /// Jobs matching the query, newest first
    pub jobs: Vec<JobInfo>,
}

impl From<sync_job::Model> for JobInfo {
    fn from(model: sync_job::Model) -> Self {
        Self {
            id: model.id.to_string(),
            job_type: model.job_type,
            status: model.status,
            params: model.params,
            result: model.result,
            error_message: model.error_message,
            progress: model.progress,
            total_records: model.total_records,
            processed_records: model.processed_records,
            created_at: model.created_at.to_rfc3339(),
            started_at: model.started_at.map(|dt| dt.to_rfc3339()),
            completed_at: model.completed_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Enqueue a new sync job
#[utoipa::path(
    post,
    path = "/sync-jobs",
    security(("bearer_auth" = [])),
    params(crate::auth::TenantHeader),
    request_body = CreateJobRequest,
    responses(
        (status = 202, description = "Job accepted and queued", body = JobInfo),
        (status = 400, description = "Invalid job type or parameters", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "sync-jobs"
)]
pub async fn create_job(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobInfo>), ApiError> {
    let repo = SyncJobRepository::new(state.db.clone());
    let params = request.params.unwrap_or_else(|| serde_json::json!({}));

    let job = repo.create(tenant.0, request.job_type, params).await?;

    Ok((StatusCode::ACCEPTED, Json(job.into())))
}

/// List sync jobs for the tenant
#[utoipa::path(
    get,
    path = "/sync-jobs",
    security(("bearer_auth" = [])),
    params(
        crate::auth::TenantHeader,
        ("status" = Option<String>, Query, description = "Filter by job status"),
        ("job_type" = Option<String>, Query, description = "Filter by job type"),
        ("limit" = Option<u32>, Query, description = "Maximum number of jobs to return (default 50, max 100)"),
        ("offset" = Option<u32>, Query, description = "Number of jobs to skip")
    ),
    responses(
        (status = 200, description = "Jobs for the tenant, newest first", body = JobsResponse),
        (status = 400, description = "Invalid query parameters", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "sync-jobs"
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<JobsResponse>, ApiError> {
    let limit = match query.limit {
        Some(0) => {
            return Err(validation_error(
                "Invalid limit",
                serde_json::json!({ "limit": "Minimum allowed limit is 1" }),
            ));
        }
        Some(value) if value > 100 => {
            return Err(validation_error(
                "Invalid limit",
                serde_json::json!({ "limit": "Maximum allowed limit is 100" }),
            ));
        }
        Some(value) => value as u64,
        None => 50,
    };

    let status = match &query.status {
        Some(raw) => Some(JobStatus::parse(raw).ok_or_else(|| {
            validation_error(
                "Invalid status",
                serde_json::json!({
                    "status": "Must be one of: pending, processing, completed, failed, canceled"
                }),
            )
        })?),
        None => None,
    };

    let job_type = match &query.job_type {
        Some(raw) => Some(JobType::parse(raw).map_err(|_| {
            validation_error(
                "Invalid job_type",
                serde_json::json!({
                    "job_type": "Must be one of: companies, employees, absences"
                }),
            )
        })?),
        None => None,
    };

    let repo = SyncJobRepository::new(state.db.clone());
    let jobs = repo
        .list_by_tenant(
            tenant.0,
            job_type,
            status,
            Some(limit),
            query.offset.map(u64::from),
        )
        .await?;

    Ok(Json(JobsResponse {
        jobs: jobs.into_iter().map(JobInfo::from).collect(),
    }))
}

/// Get one sync job by ID
#[utoipa::path(
    get,
    path = "/sync-jobs/{id}",
    security(("bearer_auth" = [])),
    params(
        crate::auth::TenantHeader,
        ("id" = Uuid, Path, description = "Sync job identifier")
    ),
    responses(
        (status = 200, description = "Sync job details", body = JobInfo),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Job not found for this tenant", body = ApiError)
    ),
    tag = "sync-jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(id): Path<Uuid>,
) -> Result<Json<JobInfo>, ApiError> {
    let repo = SyncJobRepository::new(state.db.clone());
    let job = repo
        .find_by_tenant(tenant.0, id)
        .await?
        .ok_or_else(|| not_found("Sync job not found"))?;

    Ok(Json(job.into()))
}

/// Requeue a failed sync job
#[utoipa::path(
    post,
    path = "/sync-jobs/{id}/retry",
    security(("bearer_auth" = [])),
    params(
        crate::auth::TenantHeader,
        ("id" = Uuid, Path, description = "Sync job identifier")
    ),
    responses(
        (status = 200, description = "Job requeued as pending", body = JobInfo),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Job not found for this tenant", body = ApiError),
        (status = 409, description = "Job is not in a failed state", body = ApiError)
    ),
    tag = "sync-jobs"
)]
pub async fn retry_job(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(id): Path<Uuid>,
) -> Result<Json<JobInfo>, ApiError> {
    let repo = SyncJobRepository::new(state.db.clone());
    let job = repo.retry(tenant.0, id).await?;

    Ok(Json(job.into()))
}

/// Cancel a pending sync job
#[utoipa::path(
    post,
    path = "/sync-jobs/{id}/cancel",
    security(("bearer_auth" = [])),
    params(
        crate::auth::TenantHeader,
        ("id" = Uuid, Path, description = "Sync job identifier")
    ),
    responses(
        (status = 200, description = "Job canceled", body = JobInfo),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Job not found for this tenant", body = ApiError),
        (status = 409, description = "Job already started or finished", body = ApiError)
    ),
    tag = "sync-jobs"
)]
pub async fn cancel_job(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(id): Path<Uuid>,
) -> Result<Json<JobInfo>, ApiError> {
    let repo = SyncJobRepository::new(state.db.clone());
    let job = repo.cancel(tenant.0, id).await?;

    Ok(Json(job.into()))
}
