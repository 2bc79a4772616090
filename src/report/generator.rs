//! Markdown and JSON report rendering.
//!
//! Every view renders into a sectioned Markdown document with a shared
//! metadata header, or into pretty-printed JSON via serde.

use crate::analytics::engine::{
    CategoryShare, DetailedAnalytics, GeographicData, Overview,
};
use crate::heuristics::facility::{AtRiskReport, RecommendationBuckets, RecordInsights};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata shared by every report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Record source the report was computed from.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Which view the body holds.
    pub view: String,
    /// Records that entered the aggregation pass.
    pub records_loaded: usize,
    /// Payload entries skipped during load.
    pub records_skipped: usize,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The computed body of one report.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Analytics(DetailedAnalytics),
    AtRisk(AtRiskReport),
    Recommendations(RecommendationBuckets),
    Overview(Overview),
    Geographic(GeographicData),
    Insights(RecordInsights),
}

/// A complete report: metadata plus one view body.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub report: ReportBody,
}

/// Render the document as pretty-printed JSON.
pub fn generate_json_report(document: &ReportDocument) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}

/// Render the document as Markdown.
pub fn generate_markdown_report(document: &ReportDocument) -> String {
    let mut output = String::new();

    output.push_str("# Facility Insight Report\n\n");
    output.push_str(&metadata_section(&document.metadata));

    match &document.report {
        ReportBody::Analytics(analytics) => output.push_str(&analytics_section(analytics)),
        ReportBody::AtRisk(report) => output.push_str(&at_risk_section(report)),
        ReportBody::Recommendations(buckets) => output.push_str(&recommendations_section(buckets)),
        ReportBody::Overview(overview) => output.push_str(&overview_section(overview)),
        ReportBody::Geographic(geo) => output.push_str(&geographic_section(geo)),
        ReportBody::Insights(insights) => output.push_str(&insights_section(insights)),
    }

    output.push_str(&footer());
    output
}

fn metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **View:** {}\n", metadata.view));
    section.push_str(&format!("- **Records:** {}\n", metadata.records_loaded));
    if metadata.records_skipped > 0 {
        section.push_str(&format!(
            "- **Skipped Entries:** {}\n",
            metadata.records_skipped
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn distribution_table(title: &str, shares: &[CategoryShare]) -> String {
    if shares.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str(&format!("### {title}\n\n"));
    table.push_str("| Value | Facilities | % |\n");
    table.push_str("|:---|:---:|:---:|\n");
    for share in shares {
        table.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            share.value, share.count, share.percentage
        ));
    }
    table.push('\n');
    table
}

fn analytics_section(analytics: &DetailedAnalytics) -> String {
    let mut section = String::new();

    section.push_str("## Facility Analysis\n\n");
    section.push_str(&distribution_table(
        "Condition Distribution",
        &analytics.facility_analysis.condition_distribution,
    ));
    section.push_str(&distribution_table(
        "Ownership Distribution",
        &analytics.facility_analysis.ownership_distribution,
    ));
    section.push_str(&distribution_table(
        "Assessment Type Distribution",
        &analytics.facility_analysis.assessment_type_distribution,
    ));
    section.push_str(&distribution_table(
        "Health Worker Presence",
        &analytics.facility_analysis.health_workers_distribution,
    ));
    section.push_str(&distribution_table(
        "Geopolitical Zones",
        &analytics.facility_analysis.geopolitical_zone_distribution,
    ));

    let funding = &analytics.funding_analysis;
    section.push_str("## Funding Analysis\n\n");
    section.push_str(&format!(
        "- **BHCPF Facilities:** {} ({:.2}%)\n",
        funding.bhcpf_facilities, funding.bhcpf_percentage
    ));
    section.push_str(&format!(
        "- **IMPACT Facilities:** {} ({:.2}%)\n",
        funding.impact_facilities, funding.impact_percentage
    ));
    section.push_str(&format!(
        "- **Total Funding:** {:.2}\n",
        funding.total_funding_amount
    ));
    section.push_str(&format!(
        "- **Average per Facility:** {:.2}\n\n",
        funding.average_funding_per_facility
    ));
    if !funding.funding_by_state.is_empty() {
        section.push_str("### Funding by State\n\n");
        section.push_str("| State | Amount |\n");
        section.push_str("|:---|---:|\n");
        for entry in &funding.funding_by_state {
            section.push_str(&format!("| {} | {:.2} |\n", entry.state, entry.amount));
        }
        section.push('\n');
    }

    let infra = &analytics.infrastructure_analysis;
    section.push_str("## Infrastructure Analysis\n\n");
    section.push_str("| Capability | Facilities | % |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for (label, count, pct) in [
        ("Power", infra.facilities_with_power, infra.power_percentage),
        ("Water", infra.facilities_with_water, infra.water_percentage),
        ("Internet", infra.facilities_with_internet, infra.internet_percentage),
        ("Pharmacy", infra.facilities_with_pharmacy, infra.pharmacy_percentage),
        ("Revitalized", infra.revitalized_facilities, infra.revitalization_percentage),
    ] {
        section.push_str(&format!("| {label} | {count} | {pct:.2} |\n"));
    }
    section.push('\n');

    let hr = &analytics.human_resources_analysis;
    section.push_str("## Human Resources\n\n");
    section.push_str(&format!("- **Total Staff:** {}\n", hr.total_staff));
    section.push_str(&format!(
        "- **Facilities with Staff:** {}\n",
        hr.facilities_with_staff
    ));
    section.push_str(&format!(
        "- **Average Staff per Facility:** {:.2}\n\n",
        hr.average_staff_per_facility
    ));
    if !hr.staff_by_type.is_empty() {
        section.push_str("### Staff by Type\n\n");
        section.push_str("| Type | Count |\n");
        section.push_str("|:---|:---:|\n");
        for entry in &hr.staff_by_type {
            section.push_str(&format!("| {} | {} |\n", entry.staff_type, entry.count));
        }
        section.push('\n');
    }

    let services = &analytics.services_utilization;
    section.push_str("## Services & Utilization\n\n");
    section.push_str(&format!("- **Total Patients:** {}\n", services.total_patients));
    section.push_str(&format!(
        "- **Average Patients per Facility:** {:.2}\n\n",
        services.average_patients_per_facility
    ));
    if !services.top_services_offered.is_empty() {
        section.push_str("### Top Services Offered\n\n");
        section.push_str("| Service | Facilities | % |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for entry in &services.top_services_offered {
            section.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                entry.service, entry.facilities, entry.percentage
            ));
        }
        section.push('\n');
    }

    let satisfaction = &analytics.patient_satisfaction;
    section.push_str("## Patient Satisfaction\n\n");
    section.push_str(&format!(
        "- **Average Score:** {:.2}\n",
        satisfaction.average_score
    ));
    section.push_str(&format!(
        "- **Total Responses:** {}\n\n",
        satisfaction.total_responses
    ));
    if !satisfaction.scores_by_category.is_empty() {
        section.push_str("### Scores by Category\n\n");
        section.push_str("| Category | Average | Responses |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for entry in &satisfaction.scores_by_category {
            section.push_str(&format!(
                "| {} | {:.2} | {} |\n",
                entry.category, entry.average, entry.count
            ));
        }
        section.push('\n');
    }

    let summary = &analytics.summary;
    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "- **Total Facilities:** {}\n",
        summary.total_facilities
    ));
    section.push_str(&format!(
        "- **Complete Records:** {}\n",
        summary.facilities_with_complete_data
    ));
    section.push_str(&format!(
        "- **Data Completeness:** {:.2}%\n\n",
        summary.data_completeness_percentage
    ));

    section
}

fn at_risk_section(report: &AtRiskReport) -> String {
    let mut section = String::new();

    section.push_str("## At-Risk Facilities\n\n");
    section.push_str(&format!("**Total at risk:** {}\n\n", report.total_at_risk));

    if report.facilities.is_empty() {
        section.push_str("No facilities currently meet the at-risk criteria.\n\n");
        return section;
    }

    section.push_str("| Facility | State | LGA | Condition | Priority | Risk Factors | Predicted Needs | Anomalies |\n");
    section.push_str("|:---|:---|:---|:---|:---:|:---|:---|:---:|\n");
    for facility in &report.facilities {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            facility.facility_name.as_deref().unwrap_or("-"),
            facility.state.as_deref().unwrap_or("-"),
            facility.lga.as_deref().unwrap_or("-"),
            facility.condition.as_deref().unwrap_or("-"),
            facility.priority,
            facility.risk_factors.join("; "),
            facility.predicted_needs.join("; "),
            facility.anomalies_count,
        ));
    }
    section.push('\n');

    section
}

fn recommendation_list(title: &str, entries: &[crate::heuristics::facility::RecommendationEntry]) -> String {
    let mut list = String::new();
    list.push_str(&format!("### {title}\n\n"));
    if entries.is_empty() {
        list.push_str("Nothing to report.\n\n");
        return list;
    }
    for entry in entries {
        list.push_str(&format!(
            "- **{}** ({}): {}\n",
            entry.facility.as_deref().unwrap_or("Unknown Facility"),
            entry.state.as_deref().unwrap_or("Unknown State"),
            entry.recommendation
        ));
    }
    list.push('\n');
    list
}

fn recommendations_section(buckets: &RecommendationBuckets) -> String {
    let mut section = String::new();

    section.push_str("## Recommendations\n\n");
    section.push_str(&recommendation_list("Infrastructure", &buckets.infrastructure));
    section.push_str(&recommendation_list("Staffing", &buckets.staffing));
    section.push_str(&recommendation_list("Funding", &buckets.funding));
    section.push_str(&recommendation_list("General", &buckets.general));

    section
}

fn overview_section(overview: &Overview) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Total Submissions:** {}\n",
        overview.total_submissions
    ));
    section.push_str(&format!("- **Synced:** {}\n", overview.synced_submissions));
    section.push_str(&format!("- **Pending:** {}\n", overview.pending_submissions));
    section.push_str(&format!(
        "- **Synced Percentage:** {:.2}%\n\n",
        overview.synced_percentage
    ));

    if !overview.submissions_by_state.is_empty() {
        section.push_str("### Submissions by State\n\n");
        section.push_str("| State | Count |\n|:---|:---:|\n");
        for entry in &overview.submissions_by_state {
            section.push_str(&format!("| {} | {} |\n", entry.state, entry.count));
        }
        section.push('\n');
    }

    if !overview.top_lgas.is_empty() {
        section.push_str("### Top LGAs\n\n");
        section.push_str("| LGA | Count |\n|:---|:---:|\n");
        for entry in &overview.top_lgas {
            section.push_str(&format!("| {} | {} |\n", entry.lga, entry.count));
        }
        section.push('\n');
    }

    if !overview.recent_submissions.is_empty() {
        section.push_str("### Recent Submissions\n\n");
        section.push_str("| Id | Facility | State | Created | Sync Status |\n");
        section.push_str("|:---:|:---|:---|:---|:---|\n");
        for entry in &overview.recent_submissions {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                entry.id,
                entry.facility_name.as_deref().unwrap_or("-"),
                entry.state.as_deref().unwrap_or("-"),
                entry
                    .created_at
                    .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                entry.sync_status.as_deref().unwrap_or("-"),
            ));
        }
        section.push('\n');
    }

    if !overview.submissions_over_time.is_empty() {
        section.push_str("### Activity (Last 30 Days)\n\n");
        section.push_str("| Date | Submissions |\n|:---|:---:|\n");
        for entry in &overview.submissions_over_time {
            section.push_str(&format!("| {} | {} |\n", entry.date, entry.count));
        }
        section.push('\n');
    }

    section
}

fn geographic_section(geo: &GeographicData) -> String {
    let mut section = String::new();

    section.push_str("## Facility Locations\n\n");
    if geo.facilities.is_empty() {
        section.push_str("No records carry GPS coordinates.\n\n");
        return section;
    }

    section.push_str("| Facility | State | LGA | Condition | Latitude | Longitude |\n");
    section.push_str("|:---|:---|:---|:---|---:|---:|\n");
    for facility in &geo.facilities {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.5} | {:.5} |\n",
            facility.name.as_deref().unwrap_or("-"),
            facility.state.as_deref().unwrap_or("-"),
            facility.lga.as_deref().unwrap_or("-"),
            facility.condition.as_deref().unwrap_or("-"),
            facility.latitude,
            facility.longitude,
        ));
    }
    section.push('\n');

    section
}

fn insights_section(insights: &RecordInsights) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Facility Insights: {}\n\n",
        insights.facility_name.as_deref().unwrap_or("Unknown Facility")
    ));
    section.push_str(&format!("{}\n\n", insights.summary));

    let text = &insights.text_analysis;
    section.push_str("### Issue & Comment Analysis\n\n");
    section.push_str(&format!("- **Sentiment:** {}\n", text.sentiment));
    section.push_str(&format!("- **Priority:** {}\n", text.priority));
    section.push_str(&format!("- **Topics:** {}\n", text.topics.join(", ")));
    for insight in &text.insights {
        section.push_str(&format!("- {insight}\n"));
    }
    section.push_str(&format!("\n> {}\n\n", text.summary));

    let satisfaction = &insights.satisfaction_analysis;
    section.push_str("### Patient Satisfaction\n\n");
    section.push_str(&format!(
        "- **Average Score:** {:.2} ({} responses)\n",
        satisfaction.average_score, satisfaction.total_responses
    ));
    for insight in &satisfaction.insights {
        section.push_str(&format!("- {insight}\n"));
    }
    section.push('\n');

    let predictions = &insights.predictions;
    section.push_str("### Predictions\n\n");
    section.push_str(&format!("- **Priority:** {}\n", predictions.priority_level));
    if !predictions.risk_factors.is_empty() {
        section.push_str(&format!(
            "- **Risk Factors:** {}\n",
            predictions.risk_factors.join("; ")
        ));
    }
    if !predictions.predicted_needs.is_empty() {
        section.push_str(&format!(
            "- **Predicted Needs:** {}\n",
            predictions.predicted_needs.join("; ")
        ));
    }
    if !predictions.recommendations.is_empty() {
        section.push_str(&format!(
            "- **Recommendations:** {}\n",
            predictions.recommendations.join("; ")
        ));
    }
    section.push('\n');

    if !insights.anomalies.is_empty() {
        section.push_str("### Data Quality Findings\n\n");
        for anomaly in &insights.anomalies {
            section.push_str(&format!(
                "- **{}** ({}, {}): {}\n",
                anomaly.kind, anomaly.field, anomaly.severity, anomaly.message
            ));
        }
        section.push('\n');
    }

    section
}

fn footer() -> String {
    "---\n\n*Report generated by facilityscope*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::detailed_analytics;
    use crate::heuristics::facility::{at_risk_facilities, recommendation_buckets, record_insights};
    use crate::models::SubmissionRecord;
    use serde_json::json;

    fn records() -> Vec<SubmissionRecord> {
        serde_json::from_value(json!([
            {
                "id": 1,
                "facility_name": "Garki PHC",
                "state": "FCT",
                "lga": "AMAC",
                "facility_condition": "Poor",
                "ownership_type": "Public",
                "funding_data": {"bhcpf_received": "Yes", "amount": "12,500"},
                "issues": "generator broken"
            },
            {
                "id": 2,
                "facility_name": "Dala Clinic",
                "state": "Kano",
                "lga": "Dala",
                "facility_condition": "Good",
                "ownership_type": "Private"
            }
        ]))
        .unwrap()
    }

    fn metadata(view: &str) -> ReportMetadata {
        ReportMetadata {
            source: "records.json".to_string(),
            generated_at: Utc::now(),
            view: view.to_string(),
            records_loaded: 2,
            records_skipped: 1,
            duration_seconds: 0.2,
        }
    }

    #[test]
    fn test_markdown_analytics_report() {
        let document = ReportDocument {
            metadata: metadata("analytics"),
            report: ReportBody::Analytics(detailed_analytics(&records())),
        };

        let markdown = generate_markdown_report(&document);

        assert!(markdown.contains("# Facility Insight Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("- **Skipped Entries:** 1"));
        assert!(markdown.contains("## Facility Analysis"));
        assert!(markdown.contains("| Poor | 1 | 50.00 |"));
        assert!(markdown.contains("## Funding Analysis"));
        assert!(markdown.contains("| FCT | 12500.00 |"));
        assert!(markdown.contains("## Summary"));
    }

    #[test]
    fn test_markdown_at_risk_report() {
        let document = ReportDocument {
            metadata: metadata("at-risk"),
            report: ReportBody::AtRisk(at_risk_facilities(&records())),
        };

        let markdown = generate_markdown_report(&document);

        assert!(markdown.contains("## At-Risk Facilities"));
        assert!(markdown.contains("**Total at risk:** 1"));
        assert!(markdown.contains("| Garki PHC |"));
    }

    #[test]
    fn test_markdown_recommendations_report() {
        let document = ReportDocument {
            metadata: metadata("recommendations"),
            report: ReportBody::Recommendations(recommendation_buckets(&records(), None)),
        };

        let markdown = generate_markdown_report(&document);

        assert!(markdown.contains("### Infrastructure"));
        assert!(markdown.contains("### Staffing"));
        assert!(markdown.contains("### Funding"));
        assert!(markdown.contains("- **Garki PHC** (FCT): Prioritize facility rehabilitation"));
    }

    #[test]
    fn test_markdown_insights_report() {
        let record = &records()[0];
        let document = ReportDocument {
            metadata: metadata("insights"),
            report: ReportBody::Insights(record_insights(record)),
        };

        let markdown = generate_markdown_report(&document);

        assert!(markdown.contains("## Facility Insights: Garki PHC"));
        assert!(markdown.contains("- **Sentiment:** negative"));
        assert!(markdown.contains("### Predictions"));
    }

    #[test]
    fn test_json_report_shape() {
        let document = ReportDocument {
            metadata: metadata("analytics"),
            report: ReportBody::Analytics(detailed_analytics(&records())),
        };

        let json = generate_json_report(&document).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"facility_analysis\""));
        assert!(json.contains("\"funding_analysis\""));
        assert!(json.contains("\"patient_satisfaction\""));
    }
}
