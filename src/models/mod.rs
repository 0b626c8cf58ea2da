//! # Data Models
//!
//! This module contains all the data models used throughout the HR sync
//! service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod absence;
pub mod company;
pub mod employee;
pub mod provider_config;
pub mod sync_job;
pub mod tenant;

pub use absence::Entity as Absence;
pub use company::Entity as Company;
pub use employee::Entity as Employee;
pub use provider_config::Entity as ProviderConfig;
pub use sync_job::Entity as SyncJob;
pub use tenant::Entity as Tenant;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "hrsync".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
