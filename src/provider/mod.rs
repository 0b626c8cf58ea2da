//! External HR provider integration.
//!
//! The worker talks to the provider exclusively through the [`HrDataSource`]
//! trait so synchronizers can be exercised against stub implementations in
//! tests. [`HttpHrDataSource`] is the production implementation.

pub mod http;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use http::HttpHrDataSource;
pub use types::{AbsenceRecord, CompanyRecord, EmployeeRecord};

/// Per-tenant credentials resolved from the tenant's provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_token: String,
    /// Tenant-specific base URL override; falls back to the configured
    /// default when absent.
    pub base_url: Option<String>,
}

/// Errors from the external HR provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider rate limit exceeded")]
    RateLimited,
    #[error("provider returned unexpected status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("failed to decode provider response: {message}")]
    Decode { message: String },
    #[error("invalid provider base url '{url}'")]
    InvalidBaseUrl { url: String },
}

/// Read-only access to the external HR provider's records.
#[async_trait]
pub trait HrDataSource: Send + Sync {
    /// Fetch all companies visible to the tenant.
    async fn fetch_companies(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<Vec<CompanyRecord>, ProviderError>;

    /// Fetch all employees of one company.
    async fn fetch_employees(
        &self,
        credentials: &ProviderCredentials,
        company_code: &str,
    ) -> Result<Vec<EmployeeRecord>, ProviderError>;

    /// Fetch absences of one company over an inclusive date window.
    async fn fetch_absences(
        &self,
        credentials: &ProviderCredentials,
        company_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AbsenceRecord>, ProviderError>;
}
