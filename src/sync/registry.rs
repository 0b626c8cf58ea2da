//! Synchronizer registry.
//!
//! Maps job types to their synchronizer so the worker can dispatch claimed
//! jobs without knowing about concrete implementations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use super::absences::AbsencesSynchronizer;
use super::companies::CompaniesSynchronizer;
use super::employees::EmployeesSynchronizer;
use super::{JobType, Synchronizer};
use crate::provider::HrDataSource;

/// Registry of all synchronizers keyed by job type.
pub struct Registry {
    synchronizers: HashMap<JobType, Arc<dyn Synchronizer>>,
}

impl Registry {
    /// Build the full registry over one data source.
    pub fn new(
        db: DatabaseConnection,
        data_source: Arc<dyn HrDataSource>,
        scope_throttle: Duration,
    ) -> Self {
        let mut synchronizers: HashMap<JobType, Arc<dyn Synchronizer>> = HashMap::new();

        let entries: [Arc<dyn Synchronizer>; 3] = [
            Arc::new(CompaniesSynchronizer::new(
                db.clone(),
                Arc::clone(&data_source),
            )),
            Arc::new(EmployeesSynchronizer::new(
                db.clone(),
                Arc::clone(&data_source),
                scope_throttle,
            )),
            Arc::new(AbsencesSynchronizer::new(db, data_source, scope_throttle)),
        ];

        for synchronizer in entries {
            synchronizers.insert(synchronizer.job_type(), synchronizer);
        }

        Self { synchronizers }
    }

    /// Look up the synchronizer for a job type.
    pub fn get(&self, job_type: JobType) -> Option<Arc<dyn Synchronizer>> {
        self.synchronizers.get(&job_type).cloned()
    }
}
