//! Background sync worker.
//!
//! Polls the job queue on a fixed interval, claims a small batch of pending
//! jobs, and executes them serially through the synchronizer registry. A
//! single-flight guard ensures polling cycles never overlap, so at most one
//! job runs at a time per process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, histogram};
use sea_orm::DatabaseConnection;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::models::sync_job::Model as SyncJobModel;
use crate::repositories::{ProviderConfigRepository, SyncJobRepository};
use crate::sync::registry::Registry;
use crate::sync::{JobParams, JobType, ProgressReporter, SyncContext, SyncError};

/// Worker that drains the sync job queue.
pub struct SyncWorker {
    db: DatabaseConnection,
    registry: Arc<Registry>,
    config: WorkerConfig,
    cycle_active: AtomicBool,
}

impl SyncWorker {
    pub fn new(db: DatabaseConnection, registry: Arc<Registry>, config: WorkerConfig) -> Self {
        Self {
            db,
            registry,
            config,
            cycle_active: AtomicBool::new(false),
        }
    }

    /// Run the polling loop until the cancellation token fires.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            batch_size = self.config.batch_size,
            "Sync worker started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Sync worker shutting down");
                    break;
                }
                _ = sleep(Duration::from_secs(self.config.poll_interval_seconds)) => {
                    self.run_once().await;
                }
            }
        }
    }

    /// Execute one polling cycle: claim a batch and process it serially.
    ///
    /// Skips the cycle entirely when a previous one is still running.
    pub async fn run_once(&self) {
        if self
            .cycle_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Previous polling cycle still active, skipping");
            return;
        }

        let jobs = SyncJobRepository::new(self.db.clone());
        match jobs.claim_batch(self.config.batch_size).await {
            Ok(batch) => {
                if !batch.is_empty() {
                    info!(claimed = batch.len(), "Claimed sync jobs");
                }
                for job in batch {
                    self.process_job(job).await;
                }
            }
            Err(err) => {
                error!(error = %err, "Failed to claim sync jobs");
            }
        }

        self.cycle_active.store(false, Ordering::SeqCst);
    }

    async fn process_job(&self, job: SyncJobModel) {
        let started = std::time::Instant::now();
        let job_type_label = job.job_type.clone();

        match self.execute_job(&job).await {
            Ok(()) => {
                counter!(
                    "hrsync_worker_jobs_total",
                    "job_type" => job_type_label.clone(),
                    "outcome" => "completed"
                )
                .increment(1);
            }
            Err(err) => {
                warn!(
                    job_id = %job.id,
                    tenant_id = %job.tenant_id,
                    job_type = %job.job_type,
                    error = %err,
                    "Sync job failed"
                );

                let jobs = SyncJobRepository::new(self.db.clone());
                if let Err(db_err) = jobs.fail(job.id, &err.to_string()).await {
                    error!(job_id = %job.id, error = %db_err, "Failed to mark job as failed");
                }

                counter!(
                    "hrsync_worker_jobs_total",
                    "job_type" => job_type_label.clone(),
                    "outcome" => "failed"
                )
                .increment(1);
            }
        }

        histogram!(
            "hrsync_worker_job_duration_seconds",
            "job_type" => job_type_label
        )
        .record(started.elapsed().as_secs_f64());
    }

    async fn execute_job(&self, job: &SyncJobModel) -> Result<(), SyncError> {
        let job_type = JobType::parse(&job.job_type)?;
        let params = JobParams::decode(job_type, &job.params)?;

        let provider_configs = ProviderConfigRepository::new(self.db.clone());
        let provider_config = provider_configs
            .find_active_by_tenant(job.tenant_id)
            .await?
            .ok_or(SyncError::ConfigurationMissing)?;

        let synchronizer =
            self.registry
                .get(job_type)
                .ok_or_else(|| SyncError::UnknownJobType {
                    job_type: job.job_type.clone(),
                })?;

        let jobs = SyncJobRepository::new(self.db.clone());
        let ctx = SyncContext {
            tenant_id: job.tenant_id,
            credentials: provider_config.credentials(),
            progress: ProgressReporter::new(SyncJobRepository::new(self.db.clone()), job.id),
        };

        let budget = Duration::from_secs(self.config.job_timeout_seconds);
        let outcome = match timeout(budget, synchronizer.run(&ctx, &params)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SyncError::Timeout {
                    seconds: self.config.job_timeout_seconds,
                });
            }
        };

        let completed = jobs.complete(job.id, &outcome).await?;
        if completed {
            info!(
                job_id = %job.id,
                tenant_id = %job.tenant_id,
                job_type = %job.job_type,
                total = outcome.total,
                inserted = outcome.inserted,
                updated = outcome.updated,
                "Sync job completed"
            );
        } else {
            // Lost a race against a terminal transition; nothing to write.
            warn!(job_id = %job.id, "Job left processing before completion could be recorded");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{provider_config, tenant};
    use crate::provider::{AbsenceRecord, CompanyRecord, EmployeeRecord};
    use crate::repositories::{AbsenceRepository, CompanyRepository, EmployeeRepository};
    use crate::sync::testing::StubHrDataSource;
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, Set};
    use serde_json::json;
    use std::collections::HashMap;
    use uuid::Uuid;

    async fn setup(with_provider_config: bool) -> (DatabaseConnection, Uuid) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let now = Utc::now().fixed_offset();

        let tenant_id = Uuid::new_v4();
        tenant::ActiveModel {
            id: Set(tenant_id),
            name: Set(Some("Test Tenant".to_string())),
            created_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        if with_provider_config {
            provider_config::ActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                api_token: Set("stub-token".to_string()),
                base_url: Set(None),
                active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await
            .unwrap();
        }

        (db, tenant_id)
    }

    fn worker(db: &DatabaseConnection, stub: StubHrDataSource) -> SyncWorker {
        let registry = Arc::new(Registry::new(
            db.clone(),
            Arc::new(stub),
            Duration::ZERO,
        ));
        let config = WorkerConfig {
            poll_interval_seconds: 1,
            batch_size: 5,
            job_timeout_seconds: 30,
            scope_throttle_ms: 0,
        };
        SyncWorker::new(db.clone(), registry, config)
    }

    fn company(code: &str, name: &str) -> CompanyRecord {
        CompanyRecord {
            code: code.to_string(),
            name: name.to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn company_job_runs_end_to_end() {
        let (db, tenant_id) = setup(true).await;
        let jobs = SyncJobRepository::new(db.clone());

        let job = jobs
            .create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();

        let stub = StubHrDataSource {
            companies: vec![company("001", "Acme"), company("002", "Globex")],
            ..Default::default()
        };
        worker(&db, stub).run_once().await;

        let done = jobs.find_by_tenant(tenant_id, job.id).await.unwrap().unwrap();
        assert_eq!(done.status, "completed");
        assert_eq!(done.progress, 100);
        assert_eq!(done.total_records, 2);
        assert_eq!(
            done.result,
            Some(json!({ "total": 2, "inserted": 2, "updated": 0 }))
        );

        let companies = CompanyRepository::new(db)
            .list_active(tenant_id)
            .await
            .unwrap();
        assert_eq!(companies.len(), 2);
    }

    #[tokio::test]
    async fn employee_job_fails_without_companies_then_retry_succeeds() {
        let (db, tenant_id) = setup(true).await;
        let jobs = SyncJobRepository::new(db.clone());

        let job = jobs
            .create(tenant_id, JobType::Employees, json!({}))
            .await
            .unwrap();

        let stub = StubHrDataSource {
            companies: vec![company("001", "Acme")],
            employees: HashMap::from([(
                "001".to_string(),
                vec![EmployeeRecord {
                    registration_number: "42".to_string(),
                    name: "Maria".to_string(),
                    position: None,
                    admission_date: None,
                    active: true,
                }],
            )]),
            ..Default::default()
        };

        let worker = worker(&db, stub);
        worker.run_once().await;

        let failed = jobs.find_by_tenant(tenant_id, job.id).await.unwrap().unwrap();
        assert_eq!(failed.status, "failed");
        assert!(
            failed
                .error_message
                .as_deref()
                .unwrap()
                .contains("run a 'companies' sync first")
        );

        // Sync companies, then retry the failed employee job.
        jobs.create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();
        worker.run_once().await;
        jobs.retry(tenant_id, job.id).await.unwrap();
        worker.run_once().await;

        let done = jobs.find_by_tenant(tenant_id, job.id).await.unwrap().unwrap();
        assert_eq!(done.status, "completed");

        let employee = EmployeeRepository::new(db)
            .find_by_registration(tenant_id, "42")
            .await
            .unwrap();
        assert!(employee.is_some());
    }

    #[tokio::test]
    async fn absence_jobs_are_idempotent_across_runs() {
        let (db, tenant_id) = setup(true).await;
        let jobs = SyncJobRepository::new(db.clone());

        let stub = StubHrDataSource {
            companies: vec![company("001", "Acme")],
            absences: HashMap::from([(
                "001".to_string(),
                vec![AbsenceRecord {
                    employee_registration: "42".to_string(),
                    date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                    absence_type: Some("sick".to_string()),
                    hours: Some(8.0),
                    justified: true,
                }],
            )]),
            ..Default::default()
        };
        let worker = worker(&db, stub);

        jobs.create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();
        worker.run_once().await;

        let params = json!({ "start_date": "2026-01-01", "end_date": "2026-01-31" });
        for _ in 0..2 {
            let job = jobs
                .create(tenant_id, JobType::Absences, params.clone())
                .await
                .unwrap();
            worker.run_once().await;

            let done = jobs.find_by_tenant(tenant_id, job.id).await.unwrap().unwrap();
            assert_eq!(done.status, "completed");
        }

        let company_id = CompanyRepository::new(db.clone())
            .find_by_code(tenant_id, "001")
            .await
            .unwrap()
            .unwrap()
            .id;
        let count = AbsenceRepository::new(db)
            .count_in_window(
                tenant_id,
                company_id,
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn canceled_job_is_never_executed() {
        let (db, tenant_id) = setup(true).await;
        let jobs = SyncJobRepository::new(db.clone());

        let job = jobs
            .create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();
        jobs.cancel(tenant_id, job.id).await.unwrap();

        let stub = StubHrDataSource {
            companies: vec![company("001", "Acme")],
            ..Default::default()
        };
        worker(&db, stub).run_once().await;

        let untouched = jobs.find_by_tenant(tenant_id, job.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, "canceled");

        let companies = CompanyRepository::new(db)
            .list_active(tenant_id)
            .await
            .unwrap();
        assert!(companies.is_empty());
    }

    #[tokio::test]
    async fn missing_provider_config_fails_the_job() {
        let (db, tenant_id) = setup(false).await;
        let jobs = SyncJobRepository::new(db.clone());

        let job = jobs
            .create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();

        worker(&db, StubHrDataSource::default()).run_once().await;

        let failed = jobs.find_by_tenant(tenant_id, job.id).await.unwrap().unwrap();
        assert_eq!(failed.status, "failed");
        assert!(
            failed
                .error_message
                .as_deref()
                .unwrap()
                .contains("no active provider configuration")
        );
    }

    #[tokio::test]
    async fn batch_is_processed_oldest_first() {
        let (db, tenant_id) = setup(true).await;
        let jobs = SyncJobRepository::new(db.clone());

        let first = jobs
            .create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();
        let second = jobs
            .create(tenant_id, JobType::Companies, json!({}))
            .await
            .unwrap();

        let stub = StubHrDataSource {
            companies: vec![company("001", "Acme")],
            ..Default::default()
        };
        worker(&db, stub).run_once().await;

        let first = jobs.find_by_tenant(tenant_id, first.id).await.unwrap().unwrap();
        let second = jobs
            .find_by_tenant(tenant_id, second.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.status, "completed");
        assert_eq!(second.status, "completed");
        assert!(first.completed_at.unwrap() <= second.completed_at.unwrap());
    }
}
