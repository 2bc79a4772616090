//! Data models for facility assessment analytics.
//!
//! This module contains the submission record and the shared enums used by
//! the aggregation engine and the heuristic analyzer. Record fields are
//! deserialized leniently: a field holding an unexpected type becomes `None`
//! rather than failing the whole record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A nested open attribute mapping within a record (funding, infrastructure,
/// human resources, ...). Keys and value types are not fixed by any schema.
pub type AttrBlock = Map<String, Value>;

/// Priority level assigned by the facility heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority - no pressing deficiencies detected
    Low,
    /// Medium priority - the default for any assessed facility
    Medium,
    /// High priority - facility condition is poor or critical
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Severity of a data-quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalySeverity::Low => write!(f, "low"),
            AnomalySeverity::Medium => write!(f, "medium"),
            AnomalySeverity::High => write!(f, "high"),
        }
    }
}

/// Kind of data-quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingData,
    InvalidLocation,
    Inconsistency,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyKind::MissingData => write!(f, "missing_data"),
            AnomalyKind::InvalidLocation => write!(f, "invalid_location"),
            AnomalyKind::Inconsistency => write!(f, "inconsistency"),
        }
    }
}

/// A single data-quality finding for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Kind of finding.
    pub kind: AnomalyKind,
    /// The record field the finding refers to.
    pub field: String,
    /// Severity of the finding.
    pub severity: AnomalySeverity,
    /// Human-readable description.
    pub message: String,
}

/// One submitted facility-assessment form.
///
/// Nested blocks may be absent or carry arbitrary keys of heterogeneous
/// type; consumers must never assume a key exists. The `*_data` aliases
/// accept the wire spelling used by the submission intake service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRecord {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,

    // Identity and location
    #[serde(deserialize_with = "lenient_string")]
    pub facility_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub facility_uid: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub lga: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub geopolitical_zone: Option<String>,

    // Condition and ownership
    #[serde(deserialize_with = "lenient_string")]
    pub facility_condition: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub ownership_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub assessment_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub has_health_workers: Option<String>,

    // GPS coordinates
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub altitude: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub accuracy: Option<f64>,

    // Nested attribute blocks
    #[serde(alias = "funding_data", deserialize_with = "lenient_block")]
    pub funding: Option<AttrBlock>,
    #[serde(alias = "impact_funding_data", deserialize_with = "lenient_block")]
    pub impact_funding: Option<AttrBlock>,
    #[serde(alias = "infrastructure_data", deserialize_with = "lenient_block")]
    pub infrastructure: Option<AttrBlock>,
    #[serde(alias = "human_resources_data", deserialize_with = "lenient_block")]
    pub human_resources: Option<AttrBlock>,
    #[serde(alias = "services_data", deserialize_with = "lenient_block")]
    pub services: Option<AttrBlock>,
    #[serde(alias = "commodities_data", deserialize_with = "lenient_block")]
    pub commodities: Option<AttrBlock>,
    #[serde(alias = "satisfaction_survey_data", deserialize_with = "lenient_block")]
    pub satisfaction_survey: Option<AttrBlock>,
    #[serde(alias = "financial_validation_data", deserialize_with = "lenient_block")]
    pub financial_validation: Option<AttrBlock>,

    // Free text
    #[serde(deserialize_with = "lenient_string")]
    pub issues: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub comments: Option<String>,

    // Lifecycle metadata
    #[serde(deserialize_with = "lenient_string")]
    pub submission_status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sync_status: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_synced: bool,
    #[serde(deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub synced_at: Option<DateTime<Utc>>,
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

fn lenient_block<'de, D>(deserializer: D) -> Result<Option<AttrBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => Some(map),
        _ => None,
    })
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::String(s) = value else {
        return Ok(None);
    };
    Ok(parse_timestamp(&s))
}

/// Parse an RFC 3339 timestamp, or a bare ISO timestamp without an offset
/// (treated as UTC). Anything else yields `None`.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&AnomalyKind::InvalidLocation).unwrap(),
            "\"invalid_location\""
        );
        assert_eq!(
            serde_json::to_string(&AnomalySeverity::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn test_record_parses_wire_spelling() {
        let record: SubmissionRecord = serde_json::from_value(json!({
            "id": 7,
            "facility_name": "Garki PHC",
            "state": "FCT",
            "funding_data": {"bhcpf_received": "Yes", "amount": "12,500"},
            "human_resources_data": {"nurse_staff_count": "12 nurses"},
            "is_synced": true,
            "created_at": "2024-05-01T09:30:00Z"
        }))
        .unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.facility_name.as_deref(), Some("Garki PHC"));
        assert!(record.funding.is_some());
        assert!(record.human_resources.is_some());
        assert!(record.is_synced);
        assert!(record.created_at.is_some());
        assert!(record.infrastructure.is_none());
    }

    #[test]
    fn test_record_tolerates_mismatched_types() {
        let record: SubmissionRecord = serde_json::from_value(json!({
            "id": "12",
            "facility_name": 42,
            "latitude": "abc",
            "longitude": "7.5",
            "funding_data": "not a block",
            "is_synced": "yes",
            "created_at": "last tuesday"
        }))
        .unwrap();

        assert_eq!(record.id, 12);
        assert_eq!(record.facility_name, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, Some(7.5));
        assert_eq!(record.funding, None);
        assert!(!record.is_synced);
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn test_timestamp_without_offset() {
        let record: SubmissionRecord = serde_json::from_value(json!({
            "created_at": "2024-05-01T09:30:00"
        }))
        .unwrap();
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let record: SubmissionRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record.id, 0);
        assert_eq!(record.facility_condition, None);
        assert!(record.satisfaction_survey.is_none());
        assert!(!record.is_synced);
    }
}
