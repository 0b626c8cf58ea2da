//! Wire types for provider responses.
//!
//! The provider's payloads are loosely typed: boolean flags arrive as `1`,
//! `"1"`, or `true` depending on the endpoint, and dates are occasionally
//! malformed. Deserializers here normalize those quirks so the synchronizers
//! only see clean values.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// One company as reported by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyRecord {
    pub code: String,
    pub name: String,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub active: bool,
}

/// One employee as reported by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeRecord {
    pub registration_number: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub admission_date: Option<NaiveDate>,
    #[serde(default = "default_true", deserialize_with = "flexible_bool")]
    pub active: bool,
}

/// One absence entry as reported by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AbsenceRecord {
    pub employee_registration: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub absence_type: Option<String>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub justified: bool,
}

fn default_true() -> bool {
    true
}

/// Accepts `true`, `1`, and `"1"` as true; everything else is false.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Bool(b) => b,
        JsonValue::Number(n) => n.as_i64() == Some(1),
        JsonValue::String(s) => s.trim() == "1" || s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Parses `YYYY-MM-DD` or `DD/MM/YYYY`; anything unparseable becomes `None`
/// rather than failing the whole payload.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = value else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flexible_bool_accepts_provider_variants() {
        for active in [json!(true), json!(1), json!("1"), json!("true")] {
            let record: CompanyRecord =
                serde_json::from_value(json!({ "code": "001", "name": "Acme", "active": active }))
                    .unwrap();
            assert!(record.active, "expected {:?} to be true", record);
        }

        for inactive in [json!(false), json!(0), json!("0"), json!("N"), json!(null)] {
            let record: CompanyRecord = serde_json::from_value(
                json!({ "code": "001", "name": "Acme", "active": inactive }),
            )
            .unwrap();
            assert!(!record.active, "expected {:?} to be false", record);
        }
    }

    #[test]
    fn missing_active_flag_defaults_to_true() {
        let record: CompanyRecord =
            serde_json::from_value(json!({ "code": "001", "name": "Acme" })).unwrap();
        assert!(record.active);
    }

    #[test]
    fn lenient_date_accepts_both_formats() {
        let record: EmployeeRecord = serde_json::from_value(json!({
            "registration_number": "42",
            "name": "Maria",
            "admission_date": "2021-03-15"
        }))
        .unwrap();
        assert_eq!(
            record.admission_date,
            NaiveDate::from_ymd_opt(2021, 3, 15)
        );

        let record: EmployeeRecord = serde_json::from_value(json!({
            "registration_number": "42",
            "name": "Maria",
            "admission_date": "15/03/2021"
        }))
        .unwrap();
        assert_eq!(
            record.admission_date,
            NaiveDate::from_ymd_opt(2021, 3, 15)
        );
    }

    #[test]
    fn unparseable_date_becomes_none() {
        let record: EmployeeRecord = serde_json::from_value(json!({
            "registration_number": "42",
            "name": "Maria",
            "admission_date": "not-a-date"
        }))
        .unwrap();
        assert_eq!(record.admission_date, None);

        let record: EmployeeRecord = serde_json::from_value(json!({
            "registration_number": "42",
            "name": "Maria",
            "admission_date": null
        }))
        .unwrap();
        assert_eq!(record.admission_date, None);
    }

    #[test]
    fn absence_defaults() {
        let record: AbsenceRecord = serde_json::from_value(json!({
            "employee_registration": "42",
            "date": "2026-01-10"
        }))
        .unwrap();
        assert_eq!(record.absence_type, None);
        assert_eq!(record.hours, None);
        assert!(!record.justified);
    }
}
