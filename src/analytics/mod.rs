//! Aggregation engine and extraction helpers.

pub mod engine;
pub mod extract;

pub use engine::{detailed_analytics, geographic_data, overview};
