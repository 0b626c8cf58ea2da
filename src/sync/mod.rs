//! Synchronization engine.
//!
//! Each entity kind (companies, employees, absences) has a [`Synchronizer`]
//! implementation. The worker claims queued jobs, resolves tenant
//! credentials, and dispatches to the matching synchronizer through the
//! [`registry::Registry`].

pub mod absences;
pub mod companies;
pub mod employees;
pub mod error;
pub mod registry;
pub mod types;

use async_trait::async_trait;
use sea_orm::DbErr;
use uuid::Uuid;

pub use error::SyncError;
pub use types::{JobParams, JobStatus, JobType, SyncOutcome};

use crate::provider::ProviderCredentials;
use crate::repositories::SyncJobRepository;

/// Everything a synchronizer needs to execute one job.
pub struct SyncContext {
    pub tenant_id: Uuid,
    pub credentials: ProviderCredentials,
    pub progress: ProgressReporter,
}

/// Writes progress for one job back to the queue.
///
/// Progress is 10% once the scope list is known, then advances in equal
/// steps per finished scope. Updates on a job that left `processing` are
/// silently dropped by the repository.
pub struct ProgressReporter {
    repo: SyncJobRepository,
    job_id: Uuid,
}

impl ProgressReporter {
    pub fn new(repo: SyncJobRepository, job_id: Uuid) -> Self {
        Self { repo, job_id }
    }

    /// Report that the scope list has been resolved.
    pub async fn scopes_resolved(&self) -> Result<(), DbErr> {
        self.repo.update_progress(self.job_id, 10, 0, -1).await
    }

    /// Report completion of one more scope.
    pub async fn scope_done(
        &self,
        scopes_done: usize,
        scopes_total: usize,
        processed_records: i64,
    ) -> Result<(), DbErr> {
        let progress = if scopes_total == 0 {
            100
        } else {
            10 + (scopes_done * 90 / scopes_total) as i32
        };
        self.repo
            .update_progress(
                self.job_id,
                progress,
                processed_records.min(i32::MAX as i64) as i32,
                -1,
            )
            .await
    }
}

/// One entity-kind synchronization strategy.
#[async_trait]
pub trait Synchronizer: Send + Sync {
    /// The job type this synchronizer handles.
    fn job_type(&self) -> JobType;

    /// Execute one job to completion, returning outcome counters.
    async fn run(&self, ctx: &SyncContext, params: &JobParams) -> Result<SyncOutcome, SyncError>;
}

/// Resolve the companies a per-company job iterates over.
///
/// With a `company_code` restriction the job targets exactly that company;
/// otherwise every active company of the tenant. Either way the companies
/// must already be synced locally.
pub(crate) async fn resolve_company_scopes(
    companies: &crate::repositories::CompanyRepository,
    tenant_id: Uuid,
    company_code: Option<&str>,
) -> Result<Vec<crate::models::company::Model>, SyncError> {
    match company_code {
        Some(code) => {
            let company = companies
                .find_by_code(tenant_id, code)
                .await?
                .ok_or_else(|| SyncError::InvalidParams {
                    message: format!("company '{}' is not known locally", code),
                })?;
            Ok(vec![company])
        }
        None => {
            let scopes = companies.list_active(tenant_id).await?;
            if scopes.is_empty() {
                return Err(SyncError::NoPrerequisiteData {
                    entity: "companies",
                    prerequisite: "companies",
                });
            }
            Ok(scopes)
        }
    }
}
