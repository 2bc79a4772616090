//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.facilityscope.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Record store settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "facility_report.md".to_string()
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Record source: a JSON file, a directory of JSON files, or an HTTP
    /// endpoint. Overridden by --source.
    #[serde(default)]
    pub source: String,

    /// Maximum records to load.
    #[serde(default)]
    pub max_records: Option<usize>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            source: String::new(),
            max_records: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".facilityscope.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref source) = args.source {
            self.store.source = source.clone();
        }

        if let Some(max_records) = args.max_records {
            self.store.max_records = Some(max_records);
        }

        if let Some(timeout) = args.timeout {
            self.store.timeout_seconds = timeout;
        }

        // Format always overrides since it has a default in CLI
        self.report.format = args.format;

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
