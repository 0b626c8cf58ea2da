//! Database migrations for the HR sync service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_06_01_000001_create_tenants;
mod m2026_06_01_000002_create_provider_configs;
mod m2026_06_01_000003_create_companies;
mod m2026_06_01_000004_create_employees;
mod m2026_06_01_000005_create_absences;
mod m2026_06_01_000006_create_sync_jobs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_06_01_000001_create_tenants::Migration),
            Box::new(m2026_06_01_000002_create_provider_configs::Migration),
            Box::new(m2026_06_01_000003_create_companies::Migration),
            Box::new(m2026_06_01_000004_create_employees::Migration),
            Box::new(m2026_06_01_000005_create_absences::Migration),
            Box::new(m2026_06_01_000006_create_sync_jobs::Migration),
        ]
    }
}
