//! Employee synchronizer.
//!
//! Iterates the tenant's active companies (or one company when restricted),
//! fetching and upserting each company's employees by registration number.
//! A failing company scope is logged and skipped; the job only fails when
//! every scope failed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tokio::time::sleep;

use super::{
    JobParams, JobType, SyncContext, SyncError, SyncOutcome, Synchronizer, resolve_company_scopes,
};
use crate::provider::HrDataSource;
use crate::repositories::{CompanyRepository, EmployeeRepository};

pub struct EmployeesSynchronizer {
    companies: CompanyRepository,
    employees: EmployeeRepository,
    data_source: Arc<dyn HrDataSource>,
    scope_throttle: Duration,
}

impl EmployeesSynchronizer {
    pub fn new(
        db: DatabaseConnection,
        data_source: Arc<dyn HrDataSource>,
        scope_throttle: Duration,
    ) -> Self {
        Self {
            companies: CompanyRepository::new(db.clone()),
            employees: EmployeeRepository::new(db),
            data_source,
            scope_throttle,
        }
    }
}

#[async_trait]
impl Synchronizer for EmployeesSynchronizer {
    fn job_type(&self) -> JobType {
        JobType::Employees
    }

    async fn run(&self, ctx: &SyncContext, params: &JobParams) -> Result<SyncOutcome, SyncError> {
        let scopes =
            resolve_company_scopes(&self.companies, ctx.tenant_id, params.company_code()).await?;
        let scopes_total = scopes.len();
        ctx.progress.scopes_resolved().await?;

        let mut outcome = SyncOutcome::default();
        let mut scopes_failed = 0usize;
        let mut last_error: Option<SyncError> = None;

        for (index, company) in scopes.iter().enumerate() {
            if index > 0 && !self.scope_throttle.is_zero() {
                sleep(self.scope_throttle).await;
            }

            let result = self
                .data_source
                .fetch_employees(&ctx.credentials, &company.code)
                .await;

            match result {
                Ok(records) => {
                    let counts = self
                        .employees
                        .upsert_all(ctx.tenant_id, company.id, &records)
                        .await?;
                    outcome.merge(SyncOutcome {
                        total: records.len() as u64,
                        inserted: counts.inserted,
                        updated: counts.updated,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        tenant_id = %ctx.tenant_id,
                        company_code = %company.code,
                        error = %err,
                        "Employee scope failed, continuing with remaining companies"
                    );
                    scopes_failed += 1;
                    last_error = Some(err.into());
                }
            }

            ctx.progress
                .scope_done(index + 1, scopes_total, outcome.total as i64)
                .await?;
        }

        if scopes_failed == scopes_total {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        if scopes_failed > 0 {
            tracing::warn!(
                tenant_id = %ctx.tenant_id,
                scopes_failed,
                scopes_total,
                "Employee sync finished with partial failures"
            );
        }

        Ok(outcome)
    }
}
