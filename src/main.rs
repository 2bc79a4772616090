//! Facilityscope - analytics for healthcare facility assessment surveys
//!
//! A CLI tool that loads submission records from a record store and
//! produces aggregate analytics, risk listings, and recommendations
//! for administrators.
//!
//! Exit codes:
//!   0 - Success (no at-risk facilities above threshold, or no --fail-on set)
//!   1 - Runtime error (source, config, permission, not-found, etc.)
//!   2 - At-risk facilities found above the --fail-on threshold

mod access;
mod analytics;
mod cli;
mod config;
mod heuristics;
mod models;
mod report;
mod store;

use access::require_admin;
use analytics::{detailed_analytics, geographic_data, overview};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat, View};
use config::Config;
use heuristics::{at_risk_facilities, recommendation_buckets, record_insights};
use indicatif::{ProgressBar, ProgressStyle};
use models::Priority;
use report::{ReportBody, ReportDocument, ReportMetadata};
use std::time::{Duration, Instant};
use store::{find_record, RecordStore, Source, StoreConfig};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Facilityscope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the report
    match run_report(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .facilityscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".facilityscope.toml");

    if path.exists() {
        eprintln!("⚠️  .facilityscope.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .facilityscope.toml")?;

    println!("✅ Created .facilityscope.toml with default settings.");
    println!("   Edit it to customize the record source, limits, and output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete report workflow. Returns exit code (0 or 2).
async fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if config.store.source.is_empty() {
        anyhow::bail!(
            "No record source configured. Pass --source or set [store].source in .facilityscope.toml"
        );
    }

    // Step 1: Load the records
    let source = Source::resolve(&config.store.source);
    println!("📥 Loading records from: {}", source);

    let store = RecordStore::new(
        source.clone(),
        StoreConfig {
            max_records: config.store.max_records,
            timeout_seconds: config.store.timeout_seconds,
        },
    );

    let spinner = make_spinner(&args, "Loading records...");
    let outcome = store.load().await?;
    spinner.finish_and_clear();

    info!(
        "Loaded {} records ({} entries skipped)",
        outcome.records.len(),
        outcome.skipped
    );
    if outcome.skipped > 0 {
        warn!("{} payload entries were not records", outcome.skipped);
    }

    // Handle --dry-run: report counts and exit
    if args.dry_run {
        return handle_dry_run(&outcome);
    }

    // Step 2: Check the caller may read this view
    if args.view.is_administrative() {
        if let Err(e) = require_admin(args.role, args.view.as_str()) {
            eprintln!("\n🚫 {}", e);
            return Err(e.into());
        }
    }

    // Step 3: Compute the requested view
    println!("🔬 Computing {} view over {} records...", args.view.as_str(), outcome.records.len());

    let records = &outcome.records;
    let body = match args.view {
        View::Overview => ReportBody::Overview(overview(records, Utc::now())),
        View::Analytics => ReportBody::Analytics(detailed_analytics(records)),
        View::AtRisk => {
            let mut at_risk = at_risk_facilities(records);
            if let Some(level) = args.min_priority {
                at_risk.filter_min_priority(Priority::from(level));
            }
            ReportBody::AtRisk(at_risk)
        }
        View::Recommendations => {
            ReportBody::Recommendations(recommendation_buckets(records, args.state.as_deref()))
        }
        View::Geographic => ReportBody::Geographic(geographic_data(records)),
        View::Insights => {
            let id = args.record.context("--record is required for insights")?;
            let record = find_record(records, id)?;
            ReportBody::Insights(record_insights(record))
        }
    };

    // Step 4: Render and save the report
    println!("📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        source: config.store.source.clone(),
        generated_at: Utc::now(),
        view: args.view.as_str().to_string(),
        records_loaded: outcome.records.len(),
        records_skipped: outcome.skipped,
        duration_seconds: duration,
    };

    let document = ReportDocument { metadata, report: body };

    let rendered = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&document)?,
        OutputFormat::Markdown => report::generate_markdown_report(&document),
    };

    std::fs::write(&args.output, &rendered)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    print_summary(&document);
    println!(
        "\n✅ Report complete! Saved to: {}",
        args.output.display()
    );

    // Check --fail-on threshold
    if let (View::AtRisk, Some(level)) = (args.view, args.fail_on) {
        let threshold = Priority::from(level);
        if let ReportBody::AtRisk(ref at_risk) = document.report {
            if at_risk.facilities.iter().any(|f| f.priority >= threshold) {
                eprintln!(
                    "\n⛔ At-risk facilities found at or above {:?} priority. Failing (exit code 2).",
                    level
                );
                return Ok(2);
            }
        }
    }

    Ok(0)
}

/// Handle --dry-run: print what would be analyzed and exit.
fn handle_dry_run(outcome: &store::LoadOutcome) -> Result<i32> {
    println!("\n🔍 Dry run: records loaded, no report generated.\n");
    println!("   Records: {}", outcome.records.len());
    println!("   Skipped entries: {}", outcome.skipped);

    let with_condition = outcome
        .records
        .iter()
        .filter(|r| r.facility_condition.is_some())
        .count();
    println!("   Records with a facility condition: {}", with_condition);

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Print a short per-view console summary.
fn print_summary(document: &ReportDocument) {
    println!("\n📊 Report Summary:");
    println!("   Records analyzed: {}", document.metadata.records_loaded);

    match &document.report {
        ReportBody::Analytics(analytics) => {
            println!(
                "   Complete records: {} ({:.2}%)",
                analytics.summary.facilities_with_complete_data,
                analytics.summary.data_completeness_percentage
            );
            println!(
                "   Total staff: {} | Total patients: {}",
                analytics.human_resources_analysis.total_staff,
                analytics.services_utilization.total_patients
            );
        }
        ReportBody::AtRisk(at_risk) => {
            let high = at_risk
                .facilities
                .iter()
                .filter(|f| f.priority == Priority::High)
                .count();
            println!(
                "   At-risk facilities: {} ({} high priority)",
                at_risk.total_at_risk, high
            );
        }
        ReportBody::Recommendations(buckets) => {
            println!(
                "   Recommendations: {} (infrastructure: {}, staffing: {}, funding: {}, general: {})",
                buckets.total(),
                buckets.infrastructure.len(),
                buckets.staffing.len(),
                buckets.funding.len(),
                buckets.general.len()
            );
        }
        ReportBody::Overview(overview) => {
            println!(
                "   Synced: {} | Pending: {}",
                overview.synced_submissions, overview.pending_submissions
            );
        }
        ReportBody::Geographic(geo) => {
            println!("   Facilities with coordinates: {}", geo.facilities.len());
        }
        ReportBody::Insights(insights) => {
            println!(
                "   Record {}: priority {}, {} anomalies",
                insights.record_id,
                insights.predictions.priority_level,
                insights.anomalies.len()
            );
        }
    }

    println!(
        "   Duration: {:.1}s",
        document.metadata.duration_seconds
    );
}

/// A steady-tick spinner, hidden in quiet mode.
fn make_spinner(args: &Args, message: &'static str) -> ProgressBar {
    if args.quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .facilityscope.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
