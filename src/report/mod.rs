//! Report composition and rendering.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, ReportBody, ReportDocument, ReportMetadata};
