//! Repository layer
//!
//! Repositories encapsulate SeaORM queries behind tenant-aware access
//! patterns. Handlers and the worker never touch entities directly.

pub mod absence;
pub mod company;
pub mod employee;
pub mod provider_config;
pub mod sync_job;

pub use absence::AbsenceRepository;
pub use company::CompanyRepository;
pub use employee::EmployeeRepository;
pub use provider_config::ProviderConfigRepository;
pub use sync_job::SyncJobRepository;
