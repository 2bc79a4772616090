//! Detailed analytics aggregation over the full record set.
//!
//! One read-only pass computes every section; each section is independent,
//! so a record with a malformed block still contributes to the others.
//! Empty denominators produce 0, encounter order is preserved in all
//! categorical outputs, and every top list is capped at ten entries.

use crate::analytics::extract::{
    humanize_key, is_truthy, key_matches, non_empty, parse_amount, parse_count, parse_score,
    percentage, round2, signal_present, top_n, OrderedTally, FUNDING_RECEIVED,
    IMPACT_FUNDING_RECEIVED, INFRASTRUCTURE_CAPABILITIES, PATIENT_MARKERS, SCORE_MARKERS,
    SERVICE_OFFERED_VALUES, STAFF_MARKERS,
};
use crate::models::SubmissionRecord;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TOP_LIST_LIMIT: usize = 10;

/// One literal value of a categorical field, with its share of all records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub value: String,
    pub count: u64,
    pub percentage: f64,
}

/// Distributions of the categorical facility attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityAnalysis {
    pub condition_distribution: Vec<CategoryShare>,
    pub ownership_distribution: Vec<CategoryShare>,
    pub assessment_type_distribution: Vec<CategoryShare>,
    pub health_workers_distribution: Vec<CategoryShare>,
    pub geopolitical_zone_distribution: Vec<CategoryShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFunding {
    pub state: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingAnalysis {
    pub bhcpf_facilities: u64,
    pub bhcpf_percentage: f64,
    pub impact_facilities: u64,
    pub impact_percentage: f64,
    pub total_funding_amount: f64,
    pub average_funding_per_facility: f64,
    /// Top states by accumulated amount, descending, ties in encounter order.
    pub funding_by_state: Vec<StateFunding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureAnalysis {
    pub facilities_with_power: u64,
    pub power_percentage: f64,
    pub facilities_with_water: u64,
    pub water_percentage: f64,
    pub facilities_with_internet: u64,
    pub internet_percentage: f64,
    pub facilities_with_pharmacy: u64,
    pub pharmacy_percentage: f64,
    pub revitalized_facilities: u64,
    pub revitalization_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffTypeCount {
    #[serde(rename = "type")]
    pub staff_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanResourcesAnalysis {
    pub total_staff: i64,
    pub facilities_with_staff: u64,
    pub average_staff_per_facility: f64,
    pub staff_by_type: Vec<StaffTypeCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCount {
    pub service: String,
    pub facilities: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicesUtilization {
    pub total_patients: i64,
    pub average_patients_per_facility: f64,
    pub top_services_offered: Vec<ServiceCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub average: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientSatisfaction {
    pub average_score: f64,
    pub total_responses: u64,
    pub scores_by_category: Vec<CategoryScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_facilities: u64,
    pub facilities_with_complete_data: u64,
    pub data_completeness_percentage: f64,
}

/// The composed multi-section analytics report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalytics {
    pub facility_analysis: FacilityAnalysis,
    pub funding_analysis: FundingAnalysis,
    pub infrastructure_analysis: InfrastructureAnalysis,
    pub human_resources_analysis: HumanResourcesAnalysis,
    pub services_utilization: ServicesUtilization,
    pub patient_satisfaction: PatientSatisfaction,
    pub summary: AnalyticsSummary,
}

#[derive(Debug, Default)]
struct ScoreAgg {
    sum: f64,
    count: u64,
}

/// Run the full aggregation pass over all records.
pub fn detailed_analytics(records: &[SubmissionRecord]) -> DetailedAnalytics {
    let total = records.len();

    let mut conditions: OrderedTally<u64> = OrderedTally::new();
    let mut ownerships: OrderedTally<u64> = OrderedTally::new();
    let mut assessment_types: OrderedTally<u64> = OrderedTally::new();
    let mut health_workers: OrderedTally<u64> = OrderedTally::new();
    let mut zones: OrderedTally<u64> = OrderedTally::new();

    let mut bhcpf_facilities = 0u64;
    let mut impact_facilities = 0u64;
    let mut total_funding = 0f64;
    let mut funding_by_state: OrderedTally<f64> = OrderedTally::new();

    let mut capability_counts = [0u64; INFRASTRUCTURE_CAPABILITIES.len()];

    let mut total_staff = 0i64;
    let mut facilities_with_staff = 0u64;
    let mut staff_by_type: OrderedTally<i64> = OrderedTally::new();

    let mut total_patients = 0i64;
    let mut services_offered: OrderedTally<u64> = OrderedTally::new();

    let mut score_sum = 0f64;
    let mut score_count = 0u64;
    let mut scores_by_category: OrderedTally<ScoreAgg> = OrderedTally::new();

    let mut complete = 0u64;

    for record in records {
        if let Some(condition) = non_empty(&record.facility_condition) {
            *conditions.entry(condition) += 1;
        }
        if let Some(ownership) = non_empty(&record.ownership_type) {
            *ownerships.entry(ownership) += 1;
        }
        if let Some(assessment) = non_empty(&record.assessment_type) {
            *assessment_types.entry(assessment) += 1;
        }
        if let Some(status) = non_empty(&record.has_health_workers) {
            *health_workers.entry(status) += 1;
        }
        if let Some(zone) = non_empty(&record.geopolitical_zone) {
            *zones.entry(zone) += 1;
        }

        if let Some(block) = &record.funding {
            if signal_present(block, &FUNDING_RECEIVED) {
                bhcpf_facilities += 1;
            }
            let amount = block
                .get("amount")
                .filter(|value| is_truthy(value))
                .and_then(parse_amount);
            if let Some(amount) = amount {
                total_funding += amount;
                if let Some(state) = non_empty(&record.state) {
                    *funding_by_state.entry(state) += amount;
                }
            }
        }

        if let Some(block) = &record.impact_funding {
            if signal_present(block, &IMPACT_FUNDING_RECEIVED) {
                impact_facilities += 1;
            }
        }

        if let Some(block) = &record.infrastructure {
            for (slot, (_, aliases)) in INFRASTRUCTURE_CAPABILITIES.iter().enumerate() {
                if signal_present(block, aliases) {
                    capability_counts[slot] += 1;
                }
            }
        }

        if let Some(block) = &record.human_resources {
            let mut record_staff = 0i64;
            for (key, value) in block {
                if !key_matches(key, &STAFF_MARKERS) {
                    continue;
                }
                if let Some(count) = parse_count(value) {
                    record_staff += count;
                    *staff_by_type.entry(&humanize_key(key)) += count;
                }
            }
            if record_staff > 0 {
                total_staff += record_staff;
                facilities_with_staff += 1;
            }
        }

        if let Some(block) = &record.services {
            for (key, value) in block {
                if key_matches(key, &PATIENT_MARKERS) {
                    if let Some(count) = parse_count(value) {
                        total_patients += count;
                    }
                }
            }
            for (key, value) in block {
                if let Value::String(s) = value {
                    if SERVICE_OFFERED_VALUES.contains(&s.to_lowercase().as_str()) {
                        *services_offered.entry(&humanize_key(key)) += 1;
                    }
                }
            }
        }

        if let Some(block) = &record.satisfaction_survey {
            for (key, value) in block {
                if !key_matches(key, &SCORE_MARKERS) {
                    continue;
                }
                if let Some(score) = parse_score(value) {
                    score_sum += score;
                    score_count += 1;
                    let agg = scores_by_category.entry(&humanize_key(key));
                    agg.sum += score;
                    agg.count += 1;
                }
            }
        }

        if non_empty(&record.facility_condition).is_some()
            && non_empty(&record.ownership_type).is_some()
        {
            complete += 1;
        }
    }

    let [power, water, internet, pharmacy, revitalized] = capability_counts;

    DetailedAnalytics {
        facility_analysis: FacilityAnalysis {
            condition_distribution: distribution(conditions, total),
            ownership_distribution: distribution(ownerships, total),
            assessment_type_distribution: distribution(assessment_types, total),
            health_workers_distribution: distribution(health_workers, total),
            geopolitical_zone_distribution: distribution(zones, total),
        },
        funding_analysis: FundingAnalysis {
            bhcpf_facilities,
            bhcpf_percentage: percentage(bhcpf_facilities, total),
            impact_facilities,
            impact_percentage: percentage(impact_facilities, total),
            total_funding_amount: round2(total_funding),
            average_funding_per_facility: if total == 0 {
                0.0
            } else {
                round2(total_funding / total as f64)
            },
            funding_by_state: top_n(funding_by_state.into_entries(), TOP_LIST_LIMIT)
                .into_iter()
                .map(|(state, amount)| StateFunding {
                    state,
                    amount: round2(amount),
                })
                .collect(),
        },
        infrastructure_analysis: InfrastructureAnalysis {
            facilities_with_power: power,
            power_percentage: percentage(power, total),
            facilities_with_water: water,
            water_percentage: percentage(water, total),
            facilities_with_internet: internet,
            internet_percentage: percentage(internet, total),
            facilities_with_pharmacy: pharmacy,
            pharmacy_percentage: percentage(pharmacy, total),
            revitalized_facilities: revitalized,
            revitalization_percentage: percentage(revitalized, total),
        },
        human_resources_analysis: HumanResourcesAnalysis {
            total_staff,
            facilities_with_staff,
            average_staff_per_facility: if facilities_with_staff == 0 {
                0.0
            } else {
                round2(total_staff as f64 / facilities_with_staff as f64)
            },
            staff_by_type: top_n(staff_by_type.into_entries(), TOP_LIST_LIMIT)
                .into_iter()
                .map(|(staff_type, count)| StaffTypeCount { staff_type, count })
                .collect(),
        },
        services_utilization: ServicesUtilization {
            total_patients,
            average_patients_per_facility: if total == 0 {
                0.0
            } else {
                round2(total_patients as f64 / total as f64)
            },
            top_services_offered: top_n(services_offered.into_entries(), TOP_LIST_LIMIT)
                .into_iter()
                .map(|(service, facilities)| ServiceCount {
                    service,
                    percentage: percentage(facilities, total),
                    facilities,
                })
                .collect(),
        },
        patient_satisfaction: PatientSatisfaction {
            average_score: if score_count == 0 {
                0.0
            } else {
                round2(score_sum / score_count as f64)
            },
            total_responses: score_count,
            scores_by_category: scores_by_category
                .into_entries()
                .into_iter()
                .map(|(category, agg)| CategoryScore {
                    category,
                    average: if agg.count == 0 {
                        0.0
                    } else {
                        round2(agg.sum / agg.count as f64)
                    },
                    count: agg.count,
                })
                .collect(),
        },
        summary: AnalyticsSummary {
            total_facilities: total as u64,
            facilities_with_complete_data: complete,
            data_completeness_percentage: percentage(complete, total),
        },
    }
}

fn distribution(tally: OrderedTally<u64>, total: usize) -> Vec<CategoryShare> {
    tally
        .into_entries()
        .into_iter()
        .map(|(value, count)| CategoryShare {
            value,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

// --- Overview and geographic views -------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCount {
    pub state: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LgaCount {
    pub lga: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSubmission {
    pub id: i64,
    pub facility_name: Option<String>,
    pub state: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub sync_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Headline statistics for the administrative dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_submissions: u64,
    pub synced_submissions: u64,
    pub pending_submissions: u64,
    pub synced_percentage: f64,
    pub submissions_by_state: Vec<StateCount>,
    pub top_lgas: Vec<LgaCount>,
    pub recent_submissions: Vec<RecentSubmission>,
    pub submissions_over_time: Vec<DateCount>,
}

/// Compute the overview. `now` anchors the trailing 30-day activity window.
pub fn overview(records: &[SubmissionRecord], now: DateTime<Utc>) -> Overview {
    let total = records.len();
    let synced = records.iter().filter(|r| r.is_synced).count() as u64;
    let pending = records
        .iter()
        .filter(|r| r.sync_status.as_deref() == Some("pending"))
        .count() as u64;

    let mut by_state: OrderedTally<u64> = OrderedTally::new();
    let mut by_lga: OrderedTally<u64> = OrderedTally::new();
    for record in records {
        if let Some(state) = non_empty(&record.state) {
            *by_state.entry(state) += 1;
        }
        if let Some(lga) = non_empty(&record.lga) {
            *by_lga.entry(lga) += 1;
        }
    }

    let mut recent: Vec<&SubmissionRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent_submissions = recent
        .into_iter()
        .take(TOP_LIST_LIMIT)
        .map(|record| RecentSubmission {
            id: record.id,
            facility_name: record.facility_name.clone(),
            state: record.state.clone(),
            created_at: record.created_at,
            sync_status: record.sync_status.clone(),
        })
        .collect();

    let cutoff = now - Duration::days(30);
    let mut per_day: OrderedTally<u64> = OrderedTally::new();
    for record in records {
        if let Some(created) = record.created_at {
            if created >= cutoff {
                *per_day.entry(&created.date_naive().to_string()) += 1;
            }
        }
    }
    let mut submissions_over_time: Vec<DateCount> = per_day
        .into_entries()
        .into_iter()
        .filter_map(|(date, count)| {
            date.parse::<NaiveDate>()
                .ok()
                .map(|date| DateCount { date, count })
        })
        .collect();
    submissions_over_time.sort_by_key(|entry| entry.date);

    Overview {
        total_submissions: total as u64,
        synced_submissions: synced,
        pending_submissions: pending,
        synced_percentage: percentage(synced, total),
        submissions_by_state: by_state
            .into_entries()
            .into_iter()
            .map(|(state, count)| StateCount { state, count })
            .collect(),
        top_lgas: top_n(by_lga.into_entries(), TOP_LIST_LIMIT)
            .into_iter()
            .map(|(lga, count)| LgaCount { lga, count })
            .collect(),
        recent_submissions,
        submissions_over_time,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFacility {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub state: Option<String>,
    pub lga: Option<String>,
    pub condition: Option<String>,
}

/// Facility positions for mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeographicData {
    pub facilities: Vec<GeoFacility>,
}

/// Every record that carries both coordinates.
pub fn geographic_data(records: &[SubmissionRecord]) -> GeographicData {
    let facilities = records
        .iter()
        .filter_map(|record| {
            let (latitude, longitude) = (record.latitude?, record.longitude?);
            Some(GeoFacility {
                latitude,
                longitude,
                name: record.facility_name.clone(),
                state: record.state.clone(),
                lga: record.lga.clone(),
                condition: record.facility_condition.clone(),
            })
        })
        .collect();
    GeographicData { facilities }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> SubmissionRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_record_set_is_all_zeros() {
        let analytics = detailed_analytics(&[]);

        assert!(analytics.facility_analysis.condition_distribution.is_empty());
        assert_eq!(analytics.funding_analysis.total_funding_amount, 0.0);
        assert_eq!(analytics.funding_analysis.average_funding_per_facility, 0.0);
        assert_eq!(analytics.infrastructure_analysis.power_percentage, 0.0);
        assert_eq!(analytics.human_resources_analysis.average_staff_per_facility, 0.0);
        assert_eq!(analytics.services_utilization.average_patients_per_facility, 0.0);
        assert_eq!(analytics.patient_satisfaction.average_score, 0.0);
        assert_eq!(analytics.summary.total_facilities, 0);
        assert_eq!(analytics.summary.data_completeness_percentage, 0.0);
    }

    #[test]
    fn test_condition_distribution_counts_and_percentages() {
        let records = vec![
            record(json!({"facility_condition": "Good", "ownership_type": "Public"})),
            record(json!({"facility_condition": "Good"})),
            record(json!({"facility_condition": "Poor"})),
            record(json!({})),
        ];

        let analytics = detailed_analytics(&records);
        let dist = &analytics.facility_analysis.condition_distribution;

        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].value, "Good");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[0].percentage, 50.0);
        assert_eq!(dist[1].value, "Poor");
        assert_eq!(dist[1].percentage, 25.0);

        assert_eq!(analytics.summary.facilities_with_complete_data, 1);
        assert_eq!(analytics.summary.data_completeness_percentage, 25.0);
    }

    #[test]
    fn test_funding_amounts_tolerate_garbage() {
        let records = vec![
            record(json!({
                "state": "Kano",
                "funding_data": {"bhcpf_received": "Yes", "amount": "12,500"}
            })),
            record(json!({
                "state": "Kano",
                "funding_data": {"has_bhcpf": true, "amount": "not-a-number"}
            })),
            record(json!({
                "state": "Lagos",
                "funding_data": {"amount": 500}
            })),
            record(json!({"impact_funding_data": {"received": "Yes"}})),
        ];

        let analytics = detailed_analytics(&records);
        let funding = &analytics.funding_analysis;

        assert_eq!(funding.bhcpf_facilities, 2);
        assert_eq!(funding.bhcpf_percentage, 50.0);
        assert_eq!(funding.impact_facilities, 1);
        assert_eq!(funding.total_funding_amount, 13000.0);
        assert_eq!(funding.average_funding_per_facility, 3250.0);
        assert_eq!(funding.funding_by_state.len(), 2);
        assert_eq!(funding.funding_by_state[0].state, "Kano");
        assert_eq!(funding.funding_by_state[0].amount, 12500.0);
    }

    #[test]
    fn test_infrastructure_dual_aliases() {
        let records = vec![
            record(json!({"infrastructure_data": {"has_power": "Yes", "has_water": "No"}})),
            record(json!({"infrastructure_data": {"power_available": true, "water_available": 1}})),
            record(json!({"infrastructure_data": {"has_internet": "Yes", "revitalized": "ongoing"}})),
            record(json!({})),
        ];

        let analytics = detailed_analytics(&records);
        let infra = &analytics.infrastructure_analysis;

        assert_eq!(infra.facilities_with_power, 2);
        assert_eq!(infra.power_percentage, 50.0);
        assert_eq!(infra.facilities_with_water, 1);
        assert_eq!(infra.facilities_with_internet, 1);
        assert_eq!(infra.facilities_with_pharmacy, 0);
        assert_eq!(infra.revitalized_facilities, 1);
    }

    #[test]
    fn test_staff_extraction_and_per_facility_gating() {
        let records = vec![
            record(json!({"human_resources_data": {
                "nurse_staff_count": "12 nurses",
                "doctor_personnel": 2,
                "opening_time": "08:00"
            }})),
            record(json!({"human_resources_data": {"chew_workers": "none"}})),
            record(json!({})),
        ];

        let analytics = detailed_analytics(&records);
        let hr = &analytics.human_resources_analysis;

        assert_eq!(hr.total_staff, 14);
        assert_eq!(hr.facilities_with_staff, 1);
        assert_eq!(hr.average_staff_per_facility, 14.0);
        assert_eq!(hr.staff_by_type[0].staff_type, "Nurse Staff Count");
        assert_eq!(hr.staff_by_type[0].count, 12);
    }

    #[test]
    fn test_services_and_patients() {
        let records = vec![
            record(json!({"services_data": {
                "monthly_patient_attendance": "340 visits",
                "immunization_service": "Yes",
                "anc_service": "available",
                "lab_service": "No"
            }})),
            record(json!({"services_data": {
                "patient_count": 60,
                "immunization_service": "TRUE"
            }})),
        ];

        let analytics = detailed_analytics(&records);
        let services = &analytics.services_utilization;

        assert_eq!(services.total_patients, 400);
        assert_eq!(services.average_patients_per_facility, 200.0);
        assert_eq!(services.top_services_offered[0].service, "Immunization Service");
        assert_eq!(services.top_services_offered[0].facilities, 2);
        assert_eq!(services.top_services_offered[0].percentage, 100.0);
    }

    #[test]
    fn test_satisfaction_scores_by_category() {
        let records = vec![
            record(json!({"satisfaction_survey_data": {
                "overall_satisfaction": 4,
                "wait_time_rating": "2.0",
                "comment": "fine"
            }})),
            record(json!({"satisfaction_survey_data": {
                "overall_satisfaction": "5 out of 5"
            }})),
        ];

        let analytics = detailed_analytics(&records);
        let satisfaction = &analytics.patient_satisfaction;

        assert_eq!(satisfaction.total_responses, 3);
        assert_eq!(satisfaction.average_score, 3.67);
        assert_eq!(satisfaction.scores_by_category.len(), 2);
        assert_eq!(satisfaction.scores_by_category[0].category, "Overall Satisfaction");
        assert_eq!(satisfaction.scores_by_category[0].average, 4.5);
        assert_eq!(satisfaction.scores_by_category[0].count, 2);
    }

    #[test]
    fn test_missing_block_does_not_disturb_other_sections() {
        let records = vec![record(json!({
            "facility_condition": "Good",
            "satisfaction_survey_data": {"overall_satisfaction": 4}
        }))];

        let analytics = detailed_analytics(&records);

        assert_eq!(analytics.human_resources_analysis.total_staff, 0);
        assert_eq!(analytics.funding_analysis.bhcpf_facilities, 0);
        assert_eq!(analytics.patient_satisfaction.total_responses, 1);
        assert_eq!(analytics.facility_analysis.condition_distribution.len(), 1);
    }

    #[test]
    fn test_funding_by_state_is_capped_at_ten() {
        let records: Vec<SubmissionRecord> = (0..14)
            .map(|i| {
                record(json!({
                    "state": format!("State-{i}"),
                    "funding_data": {"amount": 100 + i}
                }))
            })
            .collect();

        let analytics = detailed_analytics(&records);
        assert_eq!(analytics.funding_analysis.funding_by_state.len(), 10);
        assert_eq!(analytics.funding_analysis.funding_by_state[0].state, "State-13");
    }

    #[test]
    fn test_overview_counts_and_recency() {
        let records = vec![
            record(json!({
                "id": 1, "state": "Kano", "lga": "Dala", "is_synced": true,
                "sync_status": "synced", "created_at": "2024-05-02T08:00:00Z"
            })),
            record(json!({
                "id": 2, "state": "Kano", "lga": "Tarauni",
                "sync_status": "pending", "created_at": "2024-05-03T08:00:00Z"
            })),
            record(json!({"id": 3, "state": "Lagos"})),
        ];
        let now = "2024-05-10T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let view = overview(&records, now);

        assert_eq!(view.total_submissions, 3);
        assert_eq!(view.synced_submissions, 1);
        assert_eq!(view.pending_submissions, 1);
        assert_eq!(view.synced_percentage, 33.33);
        assert_eq!(view.submissions_by_state[0].state, "Kano");
        assert_eq!(view.submissions_by_state[0].count, 2);
        // Most recent first, undated records last.
        assert_eq!(view.recent_submissions[0].id, 2);
        assert_eq!(view.recent_submissions[2].id, 3);
        assert_eq!(view.submissions_over_time.len(), 2);
        assert!(view.submissions_over_time[0].date < view.submissions_over_time[1].date);
    }

    #[test]
    fn test_overview_excludes_stale_activity() {
        let records = vec![record(json!({"created_at": "2023-01-01T00:00:00Z"}))];
        let now = "2024-05-10T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let view = overview(&records, now);
        assert!(view.submissions_over_time.is_empty());
    }

    #[test]
    fn test_geographic_data_requires_both_coordinates() {
        let records = vec![
            record(json!({"latitude": 9.0, "longitude": 7.5, "facility_name": "A"})),
            record(json!({"latitude": 9.0})),
            record(json!({})),
        ];

        let geo = geographic_data(&records);
        assert_eq!(geo.facilities.len(), 1);
        assert_eq!(geo.facilities[0].name.as_deref(), Some("A"));
    }
}
