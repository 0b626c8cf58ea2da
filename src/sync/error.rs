//! Error taxonomy for sync execution.

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors surfaced by synchronizers and the worker while executing a job.
///
/// Every variant maps to a human-readable `error_message` persisted on the
/// failed job, so messages are written for operators rather than developers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Tenant has no active provider configuration row.
    #[error("no active provider configuration for this tenant")]
    ConfigurationMissing,

    /// The sync cannot run because prerequisite local data is absent, e.g.
    /// an employee or absence sync before any companies were synced.
    #[error("no local {entity} available; run a '{prerequisite}' sync first")]
    NoPrerequisiteData {
        entity: &'static str,
        prerequisite: &'static str,
    },

    /// The external HR provider rejected a request or was unreachable.
    #[error("provider request failed: {0}")]
    Provider(#[from] ProviderError),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// The job exceeded its wall-clock budget.
    #[error("job timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The job row carries a job_type this build does not recognize.
    #[error("unknown job type '{job_type}'")]
    UnknownJobType { job_type: String },

    /// The stored params payload does not match the job type's schema.
    #[error("invalid job parameters: {message}")]
    InvalidParams { message: String },
}
