//! Core types shared by the job queue, worker, and synchronizers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use super::error::SyncError;

/// Kind of entity a sync job targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Companies,
    Employees,
    Absences,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Companies => "companies",
            JobType::Employees => "employees",
            JobType::Absences => "absences",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SyncError> {
        match value {
            "companies" => Ok(JobType::Companies),
            "employees" => Ok(JobType::Employees),
            "absences" => Ok(JobType::Absences),
            other => Err(SyncError::UnknownJobType {
                job_type: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a sync job.
///
/// Allowed transitions: pending -> processing -> completed | failed,
/// pending -> canceled, failed -> pending (retry). Terminal states other
/// than failed never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            "canceled" => Some(JobStatus::Canceled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed request parameters for a sync job, decoded from the stored `params`
/// payload according to the job type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum JobParams {
    /// Company sync takes no parameters.
    Companies {},
    /// Employee sync, optionally restricted to one company code.
    Employees {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        company_code: Option<String>,
    },
    /// Absence sync over an inclusive date window, optionally restricted to
    /// one company code.
    Absences {
        start_date: NaiveDate,
        end_date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        company_code: Option<String>,
    },
}

impl JobParams {
    /// Decode the stored params payload for the given job type, validating
    /// shape and internal consistency.
    pub fn decode(job_type: JobType, params: &JsonValue) -> Result<Self, SyncError> {
        let decoded = match job_type {
            JobType::Companies => JobParams::Companies {},
            JobType::Employees => {
                let company_code = params
                    .get("company_code")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                JobParams::Employees { company_code }
            }
            JobType::Absences => {
                let start_date = parse_date_field(params, "start_date")?;
                let end_date = parse_date_field(params, "end_date")?;
                if end_date < start_date {
                    return Err(SyncError::InvalidParams {
                        message: format!(
                            "end_date {} precedes start_date {}",
                            end_date, start_date
                        ),
                    });
                }
                let company_code = params
                    .get("company_code")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                JobParams::Absences {
                    start_date,
                    end_date,
                    company_code,
                }
            }
        };

        Ok(decoded)
    }

    /// Company code restriction, if any.
    pub fn company_code(&self) -> Option<&str> {
        match self {
            JobParams::Companies {} => None,
            JobParams::Employees { company_code } => company_code.as_deref(),
            JobParams::Absences { company_code, .. } => company_code.as_deref(),
        }
    }
}

fn parse_date_field(params: &JsonValue, field: &str) -> Result<NaiveDate, SyncError> {
    let raw = params
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SyncError::InvalidParams {
            message: format!("missing required field '{}'", field),
        })?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SyncError::InvalidParams {
        message: format!("field '{}' must be a YYYY-MM-DD date, got '{}'", field, raw),
    })
}

/// Outcome counters for a completed sync job, persisted in the job's
/// `result` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncOutcome {
    /// Total records received from the provider
    pub total: u64,
    /// Records inserted locally
    pub inserted: u64,
    /// Records updated locally
    pub updated: u64,
}

impl SyncOutcome {
    pub fn merge(&mut self, other: SyncOutcome) {
        self.total += other.total;
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_type_round_trips() {
        for (tag, expected) in [
            ("companies", JobType::Companies),
            ("employees", JobType::Employees),
            ("absences", JobType::Absences),
        ] {
            assert_eq!(JobType::parse(tag).unwrap(), expected);
            assert_eq!(expected.as_str(), tag);
        }

        assert!(matches!(
            JobType::parse("payroll"),
            Err(SyncError::UnknownJobType { .. })
        ));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Canceled.is_terminal());
    }

    #[test]
    fn decode_absences_params() {
        let params = json!({
            "start_date": "2026-01-01",
            "end_date": "2026-01-31",
            "company_code": "001"
        });

        let decoded = JobParams::decode(JobType::Absences, &params).unwrap();
        assert_eq!(
            decoded,
            JobParams::Absences {
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
                company_code: Some("001".to_string()),
            }
        );
    }

    #[test]
    fn decode_absences_rejects_inverted_window() {
        let params = json!({
            "start_date": "2026-02-01",
            "end_date": "2026-01-01"
        });

        assert!(matches!(
            JobParams::decode(JobType::Absences, &params),
            Err(SyncError::InvalidParams { .. })
        ));
    }

    #[test]
    fn decode_absences_rejects_missing_dates() {
        let params = json!({ "start_date": "2026-01-01" });
        assert!(matches!(
            JobParams::decode(JobType::Absences, &params),
            Err(SyncError::InvalidParams { .. })
        ));
    }

    #[test]
    fn decode_employees_allows_empty_params() {
        let decoded = JobParams::decode(JobType::Employees, &json!({})).unwrap();
        assert_eq!(decoded, JobParams::Employees { company_code: None });
    }

    #[test]
    fn outcome_merges_counters() {
        let mut outcome = SyncOutcome {
            total: 10,
            inserted: 4,
            updated: 6,
        };
        outcome.merge(SyncOutcome {
            total: 5,
            inserted: 5,
            updated: 0,
        });
        assert_eq!(
            outcome,
            SyncOutcome {
                total: 15,
                inserted: 9,
                updated: 6,
            }
        );
    }
}
