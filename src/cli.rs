//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::access::Role;
use crate::models::Priority;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Facilityscope - analytics and insight engine for facility surveys
///
/// Aggregate healthcare facility assessment submissions into dashboards,
/// risk listings, and recommendations. Markdown/JSON reports.
///
/// Examples:
///   facilityscope --source submissions.json
///   facilityscope --source data/submissions/ --view at-risk --format json
///   facilityscope --source https://pfmo.example.org/api/submissions --view overview
///   facilityscope --source submissions.json --view insights --record 42
///   facilityscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Record source: a JSON file, a directory of JSON files, or an HTTP endpoint
    ///
    /// Can also be set via the [store] section of .facilityscope.toml.
    #[arg(short, long, value_name = "PATH_OR_URL", env = "FACILITYSCOPE_SOURCE")]
    pub source: Option<String>,

    /// Report view to generate
    #[arg(long, value_enum, default_value = "analytics")]
    pub view: View,

    /// Record id to analyze (required for the insights view)
    #[arg(long, value_name = "ID")]
    pub record: Option<i64>,

    /// Restrict the recommendations view to one state
    #[arg(long, value_name = "STATE")]
    pub state: Option<String>,

    /// Caller role, as validated by the upstream identity provider
    ///
    /// Administrative views (everything except insights) require admin.
    #[arg(long, value_enum, default_value = "admin", env = "FACILITYSCOPE_ROLE")]
    pub role: Role,

    /// Output file path for the report
    #[arg(short, long, default_value = "facility_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, value_enum, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .facilityscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum number of records to load
    #[arg(long, value_name = "COUNT")]
    pub max_records: Option<usize>,

    /// HTTP request timeout in seconds (remote sources)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Minimum priority to include in the at-risk listing
    ///
    /// Facilities below this level are filtered out. Values: high, medium, low
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub min_priority: Option<PriorityLevel>,

    /// Fail if at-risk facilities at or above this priority exist
    ///
    /// Useful for monitoring pipelines. Exit code 2 when the threshold is
    /// exceeded. Only valid with the at-risk view. Values: high, medium, low
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub fail_on: Option<PriorityLevel>,

    /// Dry run: load and validate records without generating a report
    ///
    /// Shows how many records would be analyzed and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .facilityscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Headline dashboard statistics
    Overview,
    /// Full multi-section analytics (default)
    #[default]
    Analytics,
    /// Facilities at risk, high priority first
    AtRisk,
    /// Recommendations routed into fixed buckets
    Recommendations,
    /// Facility positions for mapping
    Geographic,
    /// Full insight bundle for a single record
    Insights,
}

impl View {
    /// Stable name used in report metadata and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Analytics => "analytics",
            View::AtRisk => "at-risk",
            View::Recommendations => "recommendations",
            View::Geographic => "geographic",
            View::Insights => "insights",
        }
    }

    /// Whether the view exposes cross-facility administrative data.
    pub fn is_administrative(&self) -> bool {
        !matches!(self, View::Insights)
    }
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Priority level for --fail-on and --min-priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

impl From<PriorityLevel> for Priority {
    fn from(level: PriorityLevel) -> Self {
        match level {
            PriorityLevel::Low => Priority::Low,
            PriorityLevel::Medium => Priority::Medium,
            PriorityLevel::High => Priority::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.view == View::Insights && self.record.is_none() {
            return Err("The insights view requires --record <ID>".to_string());
        }

        if self.record.is_some() && self.view != View::Insights {
            return Err("--record is only valid with the insights view".to_string());
        }

        if self.state.is_some() && self.view != View::Recommendations {
            return Err("--state is only valid with the recommendations view".to_string());
        }

        if self.fail_on.is_some() && self.view != View::AtRisk {
            return Err("--fail-on is only valid with the at-risk view".to_string());
        }

        if self.min_priority.is_some() && self.view != View::AtRisk {
            return Err("--min-priority is only valid with the at-risk view".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(max_records) = self.max_records {
            if max_records == 0 {
                return Err("Max records must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
