//! Heuristic analyzers: text sentiment, satisfaction surveys, and
//! per-record facility risk rules.

pub mod facility;
pub mod text;

pub use facility::{
    at_risk_facilities, detect_data_anomalies, insights_summary, predict_facility_needs,
    recommendation_buckets, record_insights,
};
pub use text::{analyze_satisfaction, analyze_text};
