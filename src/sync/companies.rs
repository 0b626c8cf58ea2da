//! Company synchronizer.
//!
//! Fetches the tenant's company list from the provider and upserts it by
//! company code. Runs as a single scope.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::{JobParams, JobType, SyncContext, SyncError, SyncOutcome, Synchronizer};
use crate::provider::HrDataSource;
use crate::repositories::CompanyRepository;

pub struct CompaniesSynchronizer {
    companies: CompanyRepository,
    data_source: Arc<dyn HrDataSource>,
}

impl CompaniesSynchronizer {
    pub fn new(db: DatabaseConnection, data_source: Arc<dyn HrDataSource>) -> Self {
        Self {
            companies: CompanyRepository::new(db),
            data_source,
        }
    }
}

#[async_trait]
impl Synchronizer for CompaniesSynchronizer {
    fn job_type(&self) -> JobType {
        JobType::Companies
    }

    async fn run(&self, ctx: &SyncContext, _params: &JobParams) -> Result<SyncOutcome, SyncError> {
        ctx.progress.scopes_resolved().await?;

        let records = self.data_source.fetch_companies(&ctx.credentials).await?;
        let total = records.len() as u64;

        let counts = self.companies.upsert_all(ctx.tenant_id, &records).await?;

        ctx.progress.scope_done(1, 1, total as i64).await?;

        tracing::info!(
            tenant_id = %ctx.tenant_id,
            total,
            inserted = counts.inserted,
            updated = counts.updated,
            "Company sync finished"
        );

        Ok(SyncOutcome {
            total,
            inserted: counts.inserted,
            updated: counts.updated,
        })
    }
}
