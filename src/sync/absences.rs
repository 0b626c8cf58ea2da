//! Absence synchronizer.
//!
//! For each company in scope, fetches the absence list over the requested
//! date window and replaces the locally stored window wholesale. Re-running
//! the same job converges to the provider's state instead of accumulating
//! duplicates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tokio::time::sleep;

use super::{
    JobParams, JobType, SyncContext, SyncError, SyncOutcome, Synchronizer, resolve_company_scopes,
};
use crate::provider::HrDataSource;
use crate::repositories::{AbsenceRepository, CompanyRepository};

pub struct AbsencesSynchronizer {
    companies: CompanyRepository,
    absences: AbsenceRepository,
    data_source: Arc<dyn HrDataSource>,
    scope_throttle: Duration,
}

impl AbsencesSynchronizer {
    pub fn new(
        db: DatabaseConnection,
        data_source: Arc<dyn HrDataSource>,
        scope_throttle: Duration,
    ) -> Self {
        Self {
            companies: CompanyRepository::new(db.clone()),
            absences: AbsenceRepository::new(db),
            data_source,
            scope_throttle,
        }
    }

    async fn sync_scope(
        &self,
        ctx: &SyncContext,
        company_id: uuid::Uuid,
        company_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SyncOutcome, SyncError> {
        let records = self
            .data_source
            .fetch_absences(&ctx.credentials, company_code, start_date, end_date)
            .await?;

        let inserted = self
            .absences
            .replace_window(ctx.tenant_id, company_id, start_date, end_date, &records)
            .await?;

        Ok(SyncOutcome {
            total: records.len() as u64,
            inserted,
            updated: 0,
        })
    }
}

#[async_trait]
impl Synchronizer for AbsencesSynchronizer {
    fn job_type(&self) -> JobType {
        JobType::Absences
    }

    async fn run(&self, ctx: &SyncContext, params: &JobParams) -> Result<SyncOutcome, SyncError> {
        let JobParams::Absences {
            start_date,
            end_date,
            company_code,
        } = params
        else {
            return Err(SyncError::InvalidParams {
                message: "absence sync requires a date window".to_string(),
            });
        };

        let scopes =
            resolve_company_scopes(&self.companies, ctx.tenant_id, company_code.as_deref()).await?;
        let scopes_total = scopes.len();
        ctx.progress.scopes_resolved().await?;

        let mut outcome = SyncOutcome::default();
        let mut scopes_failed = 0usize;
        let mut last_error: Option<SyncError> = None;

        for (index, company) in scopes.iter().enumerate() {
            if index > 0 && !self.scope_throttle.is_zero() {
                sleep(self.scope_throttle).await;
            }

            match self
                .sync_scope(ctx, company.id, &company.code, *start_date, *end_date)
                .await
            {
                Ok(scope_outcome) => outcome.merge(scope_outcome),
                Err(err @ SyncError::Storage(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        tenant_id = %ctx.tenant_id,
                        company_code = %company.code,
                        error = %err,
                        "Absence scope failed, continuing with remaining companies"
                    );
                    scopes_failed += 1;
                    last_error = Some(err);
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
                "Absence sync finished with partial failures"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tenant;
    use crate::provider::{AbsenceRecord, CompanyRecord};
    use crate::repositories::SyncJobRepository;
    use crate::sync::testing::{StubHrDataSource, stub_credentials};
    use crate::sync::ProgressReporter;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, Set};
    use serde_json::json;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn absence(registration: &str, date: NaiveDate) -> AbsenceRecord {
        AbsenceRecord {
            employee_registration: registration.to_string(),
            date,
            absence_type: None,
            hours: Some(8.0),
            justified: false,
        }
    }

    fn window_params() -> JobParams {
        JobParams::Absences {
            start_date: day(1),
            end_date: day(31),
            company_code: None,
        }
    }

    async fn setup() -> (DatabaseConnection, Uuid, Uuid) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let tenant_id = Uuid::new_v4();
        tenant::ActiveModel {
            id: Set(tenant_id),
            name: Set(None),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&db)
        .await
        .unwrap();

        let companies = CompanyRepository::new(db.clone());
        companies
            .upsert_all(
                tenant_id,
                &[CompanyRecord {
                    code: "001".to_string(),
                    name: "Acme".to_string(),
                    active: true,
                }],
            )
            .await
            .unwrap();
        let company_id = companies
            .find_by_code(tenant_id, "001")
            .await
            .unwrap()
            .unwrap()
            .id;

        (db, tenant_id, company_id)
    }

    async fn context(db: &DatabaseConnection, tenant_id: Uuid) -> SyncContext {
        let repo = SyncJobRepository::new(db.clone());
        let job = repo
            .create(
                tenant_id,
                JobType::Absences,
                json!({ "start_date": "2026-01-01", "end_date": "2026-01-31" }),
            )
            .await
            .unwrap();
        repo.claim_batch(1).await.unwrap();

        SyncContext {
            tenant_id,
            credentials: stub_credentials(),
            progress: ProgressReporter::new(SyncJobRepository::new(db.clone()), job.id),
        }
    }

    #[tokio::test]
    async fn rerunning_the_same_window_converges() {
        let (db, tenant_id, company_id) = setup().await;
        let ctx = context(&db, tenant_id).await;

        let stub = StubHrDataSource {
            absences: HashMap::from([(
                "001".to_string(),
                vec![absence("42", day(10)), absence("43", day(11))],
            )]),
            ..Default::default()
        };
        let synchronizer = AbsencesSynchronizer::new(db.clone(), Arc::new(stub), Duration::ZERO);

        for _ in 0..2 {
            let outcome = synchronizer.run(&ctx, &window_params()).await.unwrap();
            assert_eq!(outcome.total, 2);
            assert_eq!(outcome.inserted, 2);
        }

        let count = AbsenceRepository::new(db)
            .count_in_window(tenant_id, company_id, day(1), day(31))
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn provider_shrinking_the_window_removes_stale_rows() {
        let (db, tenant_id, company_id) = setup().await;
        let ctx = context(&db, tenant_id).await;

        let full = StubHrDataSource {
            absences: HashMap::from([(
                "001".to_string(),
                vec![absence("42", day(10)), absence("43", day(11))],
            )]),
            ..Default::default()
        };
        AbsencesSynchronizer::new(db.clone(), Arc::new(full), Duration::ZERO)
            .run(&ctx, &window_params())
            .await
            .unwrap();

        let shrunk = StubHrDataSource {
            absences: HashMap::from([("001".to_string(), vec![absence("42", day(10))])]),
            ..Default::default()
        };
        AbsencesSynchronizer::new(db.clone(), Arc::new(shrunk), Duration::ZERO)
            .run(&ctx, &window_params())
            .await
            .unwrap();

        let count = AbsenceRepository::new(db)
            .count_in_window(tenant_id, company_id, day(1), day(31))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn requires_window_params() {
        let (db, tenant_id, _) = setup().await;
        let ctx = context(&db, tenant_id).await;

        let err = AbsencesSynchronizer::new(
            db.clone(),
            Arc::new(StubHrDataSource::default()),
            Duration::ZERO,
        )
        .run(&ctx, &JobParams::Companies {})
        .await
        .unwrap_err();

        assert!(matches!(err, SyncError::InvalidParams { .. }));
    }
}
