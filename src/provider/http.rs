//! HTTP implementation of [`HrDataSource`] backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    AbsenceRecord, CompanyRecord, EmployeeRecord, HrDataSource, ProviderCredentials, ProviderError,
};
use crate::config::ProviderConfig;

/// Production HR provider client.
#[derive(Debug, Clone)]
pub struct HttpHrDataSource {
    client: Client,
    default_base_url: String,
}

impl HttpHrDataSource {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            default_base_url: config.base_url.clone(),
        })
    }

    fn resolve_url(
        &self,
        credentials: &ProviderCredentials,
        path: &str,
    ) -> Result<Url, ProviderError> {
        let base = credentials
            .base_url
            .as_deref()
            .unwrap_or(&self.default_base_url);

        // Url::join drops the last path segment without a trailing slash.
        let mut normalized = base.trim_end_matches('/').to_string();
        normalized.push('/');

        let base = Url::parse(&normalized).map_err(|_| ProviderError::InvalidBaseUrl {
            url: base.to_string(),
        })?;
        base.join(path).map_err(|_| ProviderError::InvalidBaseUrl {
            url: format!("{}{}", normalized, path),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        credentials: &ProviderCredentials,
        url: Url,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&credentials.api_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                response
                    .json::<T>()
                    .await
                    .map_err(|err| ProviderError::Decode {
                        message: err.to_string(),
                    })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            status => {
                tracing::warn!(%url, status = status.as_u16(), "Provider request rejected");
                Err(ProviderError::UnexpectedStatus {
                    status: status.as_u16(),
                })
            }
        }
    }
}

#[async_trait]
impl HrDataSource for HttpHrDataSource {
    async fn fetch_companies(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<Vec<CompanyRecord>, ProviderError> {
        let url = self.resolve_url(credentials, "companies")?;
        self.get_json(credentials, url).await
    }

    async fn fetch_employees(
        &self,
        credentials: &ProviderCredentials,
        company_code: &str,
    ) -> Result<Vec<EmployeeRecord>, ProviderError> {
        let url = self.resolve_url(credentials, &format!("companies/{}/employees", company_code))?;
        self.get_json(credentials, url).await
    }

    async fn fetch_absences(
        &self,
        credentials: &ProviderCredentials,
        company_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<AbsenceRecord>, ProviderError> {
        let mut url =
            self.resolve_url(credentials, &format!("companies/{}/absences", company_code))?;
        url.query_pairs_mut()
            .append_pair("start_date", &start_date.to_string())
            .append_pair("end_date", &end_date.to_string());
        self.get_json(credentials, url).await
    }
}
