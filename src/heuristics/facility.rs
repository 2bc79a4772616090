//! Per-record facility risk heuristics and the views composed from them.
//!
//! Every function here is a pure function of a single record: the same
//! record always produces the same output, independent of the rest of the
//! set. Rules that read a nested block are evaluated only when that block
//! is present.

use crate::analytics::extract::{
    is_truthy, non_empty, signal_present, staff_total, FUNDING_STATUS_RECEIVED, POWER_AVAILABLE,
    WATER_AVAILABLE,
};
use crate::heuristics::text::{analyze_satisfaction, analyze_text, SatisfactionAnalysis, TextAnalysis};
use crate::models::{Anomaly, AnomalyKind, AnomalySeverity, Priority, SubmissionRecord};
use serde::{Deserialize, Serialize};

/// A facility staffed below this headcount is flagged as under-staffed.
const MIN_STAFF: i64 = 5;

/// Nigeria bounding box for coordinate sanity checks.
const LATITUDE_BOUNDS: (f64, f64) = (4.0, 14.0);
const LONGITUDE_BOUNDS: (f64, f64) = (2.0, 15.0);

/// Predicted needs and risk posture of one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityPredictions {
    pub priority_level: Priority,
    pub predicted_needs: Vec<String>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for FacilityPredictions {
    fn default() -> Self {
        Self {
            priority_level: Priority::Medium,
            predicted_needs: Vec::new(),
            risk_factors: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Evaluate the deficiency rules for one record. Rules are independent and
/// non-exclusive; only the condition rule escalates the priority.
pub fn predict_facility_needs(record: &SubmissionRecord) -> FacilityPredictions {
    let mut predictions = FacilityPredictions::default();

    if let Some(condition) = non_empty(&record.facility_condition) {
        let condition = condition.to_lowercase();
        if condition == "poor" || condition == "critical" {
            predictions.priority_level = Priority::High;
            predictions.risk_factors.push("Poor facility condition".to_string());
            predictions.predicted_needs.push("Infrastructure improvement".to_string());
            predictions
                .recommendations
                .push("Prioritize facility rehabilitation".to_string());
        }
    }

    if let Some(block) = &record.human_resources {
        if staff_total(block) < MIN_STAFF {
            predictions.risk_factors.push("Insufficient staffing".to_string());
            predictions
                .predicted_needs
                .push("Additional healthcare workers".to_string());
            predictions
                .recommendations
                .push("Recruit and train more staff".to_string());
        }
    }

    if let Some(block) = &record.funding {
        if !signal_present(block, &FUNDING_STATUS_RECEIVED) {
            predictions.risk_factors.push("Lack of funding".to_string());
            predictions.predicted_needs.push("Financial support".to_string());
            predictions
                .recommendations
                .push("Apply for BHCPF or IMPACT funding".to_string());
        }
    }

    if let Some(block) = &record.infrastructure {
        if !signal_present(block, &POWER_AVAILABLE) {
            predictions.predicted_needs.push("Power supply".to_string());
            predictions
                .recommendations
                .push("Install or repair power infrastructure".to_string());
        }
        if !signal_present(block, &WATER_AVAILABLE) {
            predictions.predicted_needs.push("Water supply".to_string());
            predictions
                .recommendations
                .push("Ensure reliable water access".to_string());
        }
    }

    predictions
}

/// Detect data-quality findings for one record, in a fixed rule order.
pub fn detect_data_anomalies(record: &SubmissionRecord) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    let critical_fields: [(&str, &Option<String>); 4] = [
        ("facility_name", &record.facility_name),
        ("state", &record.state),
        ("lga", &record.lga),
        ("facility_condition", &record.facility_condition),
    ];
    for (field, value) in critical_fields {
        if non_empty(value).is_none() {
            anomalies.push(Anomaly {
                kind: AnomalyKind::MissingData,
                field: field.to_string(),
                severity: AnomalySeverity::High,
                message: format!("Missing critical field: {field}"),
            });
        }
    }

    // A 0.0 coordinate is the null-island artifact of a failed GPS fix and
    // is treated as absent.
    if let (Some(lat), Some(lon)) = (record.latitude, record.longitude) {
        if lat != 0.0 && lon != 0.0 {
            let lat_ok = (LATITUDE_BOUNDS.0..=LATITUDE_BOUNDS.1).contains(&lat);
            let lon_ok = (LONGITUDE_BOUNDS.0..=LONGITUDE_BOUNDS.1).contains(&lon);
            if !lat_ok || !lon_ok {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::InvalidLocation,
                    field: "coordinates".to_string(),
                    severity: AnomalySeverity::Medium,
                    message: format!("Coordinates ({lat}, {lon}) appear to be outside Nigeria"),
                });
            }
        }
    }

    if record.has_health_workers.as_deref() == Some("No") {
        if let Some(block) = &record.human_resources {
            if block.values().any(is_truthy) {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::Inconsistency,
                    field: "health_workers".to_string(),
                    severity: AnomalySeverity::Medium,
                    message: "Form indicates no health workers but HR data exists".to_string(),
                });
            }
        }
    }

    anomalies
}

/// One-paragraph narrative of a record's posture, clauses joined with ". ".
pub fn insights_summary(record: &SubmissionRecord) -> String {
    let name = non_empty(&record.facility_name).unwrap_or("Unknown Facility");
    let state = non_empty(&record.state).unwrap_or("Unknown State");
    let condition = non_empty(&record.facility_condition).unwrap_or("Unknown");

    let predictions = predict_facility_needs(record);
    let anomalies = detect_data_anomalies(record);

    let mut parts = vec![
        format!("Facility: {name} in {state}"),
        format!("Condition: {condition}"),
    ];
    if !predictions.risk_factors.is_empty() {
        parts.push(format!("Risk Factors: {}", predictions.risk_factors.join(", ")));
    }
    if !predictions.predicted_needs.is_empty() {
        parts.push(format!(
            "Predicted Needs: {}",
            predictions.predicted_needs.join(", ")
        ));
    }
    if !anomalies.is_empty() {
        parts.push(format!(
            "Data Quality Issues: {} anomalies detected",
            anomalies.len()
        ));
    }

    format!("{}.", parts.join(". "))
}

/// One facility in the at-risk listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskFacility {
    pub id: i64,
    pub facility_name: Option<String>,
    pub state: Option<String>,
    pub lga: Option<String>,
    pub condition: Option<String>,
    pub priority: Priority,
    pub risk_factors: Vec<String>,
    pub predicted_needs: Vec<String>,
    pub anomalies_count: usize,
}

/// The at-risk view over the full record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtRiskReport {
    pub total_at_risk: usize,
    pub facilities: Vec<AtRiskFacility>,
}

impl AtRiskReport {
    /// Drop facilities below `min_priority` and refresh the total.
    pub fn filter_min_priority(&mut self, min_priority: Priority) {
        self.facilities.retain(|f| f.priority >= min_priority);
        self.total_at_risk = self.facilities.len();
    }
}

/// Collect every facility that is high priority or carries anomalies.
/// High-priority facilities sort first; the sort is stable, so ties keep
/// the order records arrived in.
pub fn at_risk_facilities(records: &[SubmissionRecord]) -> AtRiskReport {
    let mut facilities: Vec<AtRiskFacility> = records
        .iter()
        .filter_map(|record| {
            let predictions = predict_facility_needs(record);
            let anomalies = detect_data_anomalies(record);
            if predictions.priority_level != Priority::High && anomalies.is_empty() {
                return None;
            }
            Some(AtRiskFacility {
                id: record.id,
                facility_name: record.facility_name.clone(),
                state: record.state.clone(),
                lga: record.lga.clone(),
                condition: record.facility_condition.clone(),
                priority: predictions.priority_level,
                risk_factors: predictions.risk_factors,
                predicted_needs: predictions.predicted_needs,
                anomalies_count: anomalies.len(),
            })
        })
        .collect();

    facilities.sort_by_key(|f| u8::from(f.priority != Priority::High));

    AtRiskReport {
        total_at_risk: facilities.len(),
        facilities,
    }
}

/// One routed recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub facility: Option<String>,
    pub state: Option<String>,
    pub recommendation: String,
}

/// Recommendations routed into the four fixed buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBuckets {
    pub infrastructure: Vec<RecommendationEntry>,
    pub staffing: Vec<RecommendationEntry>,
    pub funding: Vec<RecommendationEntry>,
    pub general: Vec<RecommendationEntry>,
}

impl RecommendationBuckets {
    pub fn total(&self) -> usize {
        self.infrastructure.len() + self.staffing.len() + self.funding.len() + self.general.len()
    }
}

/// Predict every facility's recommendations and route them by keyword.
/// An exact `state_filter` restricts which records contribute.
pub fn recommendation_buckets(
    records: &[SubmissionRecord],
    state_filter: Option<&str>,
) -> RecommendationBuckets {
    let mut buckets = RecommendationBuckets::default();

    for record in records {
        if let Some(filter) = state_filter {
            if record.state.as_deref() != Some(filter) {
                continue;
            }
        }

        let predictions = predict_facility_needs(record);
        for recommendation in predictions.recommendations {
            let lower = recommendation.to_lowercase();
            let bucket = if ["infrastructure", "power", "water"]
                .iter()
                .any(|kw| lower.contains(kw))
            {
                &mut buckets.infrastructure
            } else if ["staff", "worker"].iter().any(|kw| lower.contains(kw)) {
                &mut buckets.staffing
            } else if ["funding", "financial"].iter().any(|kw| lower.contains(kw)) {
                &mut buckets.funding
            } else {
                &mut buckets.general
            };
            bucket.push(RecommendationEntry {
                facility: record.facility_name.clone(),
                state: record.state.clone(),
                recommendation,
            });
        }
    }

    buckets
}

/// The full insight bundle for a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInsights {
    pub record_id: i64,
    pub facility_name: Option<String>,
    pub text_analysis: TextAnalysis,
    pub satisfaction_analysis: SatisfactionAnalysis,
    pub predictions: FacilityPredictions,
    pub anomalies: Vec<Anomaly>,
    pub summary: String,
}

/// Analyze one record end to end.
pub fn record_insights(record: &SubmissionRecord) -> RecordInsights {
    RecordInsights {
        record_id: record.id,
        facility_name: record.facility_name.clone(),
        text_analysis: analyze_text(
            record.issues.as_deref().unwrap_or(""),
            record.comments.as_deref().unwrap_or(""),
        ),
        satisfaction_analysis: analyze_satisfaction(record.satisfaction_survey.as_ref()),
        predictions: predict_facility_needs(record),
        anomalies: detect_data_anomalies(record),
        summary: insights_summary(record),
    }
}
