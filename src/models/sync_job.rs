//! SyncJob entity model
//!
//! This module contains the SeaORM entity model for the sync_jobs table,
//! which represents queued units of synchronization work against the external
//! HR provider.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// SyncJob entity representing one queued unit of synchronization work
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_jobs")]
pub struct Model {
    /// Unique identifier for the sync job (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Tenant identifier for multi-tenancy
    pub tenant_id: Uuid,

    /// Kind of entity being synced (companies, employees, absences)
    pub job_type: String,

    /// Current lifecycle status (pending, processing, completed, failed, canceled)
    pub status: String,

    /// Request payload fixed at creation; never mutated afterwards
    #[sea_orm(column_type = "JsonBinary")]
    pub params: JsonValue,

    /// Outcome counters, written once on transition to completed
    #[sea_orm(column_type = "JsonBinary")]
    pub result: Option<JsonValue>,

    /// Human-readable failure description, written once on transition to failed
    pub error_message: Option<String>,

    /// Percentage 0-100, monotonically non-decreasing while processing
    pub progress: i32,

    /// Expected record count for a determinate progress bar; -1 while unknown
    pub total_records: i32,

    /// Records processed so far across all scopes
    pub processed_records: i32,

    /// Timestamp when the job was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the worker first claimed the job
    pub started_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the job reached a terminal state
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
