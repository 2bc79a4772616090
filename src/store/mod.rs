//! Record store client.
//!
//! Loads submission records read-only from a JSON file, a directory of JSON
//! files, or an HTTP endpoint. A payload entry that is not an object is
//! skipped and counted rather than failing the load; in a directory source,
//! an unreadable or unparseable file is logged and skipped.

use crate::models::SubmissionRecord;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// How many directory files are read concurrently.
const READ_CONCURRENCY: usize = 8;

/// Errors surfaced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch records from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse records in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {0} not found")]
    RecordNotFound(i64),
}

/// Where records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Directory(PathBuf),
    Url(String),
}

impl Source {
    /// Resolve a source spec: URLs by scheme, paths by what is on disk.
    pub fn resolve(spec: &str) -> Self {
        if spec.starts_with("http://") || spec.starts_with("https://") {
            return Source::Url(spec.to_string());
        }
        let path = PathBuf::from(spec);
        if path.is_dir() {
            Source::Directory(path)
        } else {
            Source::File(path)
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) | Source::Directory(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Store client settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Cap on the number of records kept after load.
    pub max_records: Option<usize>,
    /// HTTP request timeout.
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_records: None,
            timeout_seconds: 30,
        }
    }
}

/// Result of one load pass.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<SubmissionRecord>,
    /// Payload entries that were not objects.
    pub skipped: usize,
}

impl LoadOutcome {
    fn merge(&mut self, other: LoadOutcome) {
        self.records.extend(other.records);
        self.skipped += other.skipped;
    }
}

/// Read-only client over one record source.
pub struct RecordStore {
    source: Source,
    config: StoreConfig,
}

impl RecordStore {
    pub fn new(source: Source, config: StoreConfig) -> Self {
        Self { source, config }
    }

    /// Load all records from the source.
    pub async fn load(&self) -> Result<LoadOutcome, StoreError> {
        let mut outcome = match &self.source {
            Source::File(path) => load_file(path).await?,
            Source::Directory(path) => self.load_directory(path).await?,
            Source::Url(url) => self.load_url(url).await?,
        };

        if let Some(max) = self.config.max_records {
            outcome.records.truncate(max);
        }

        debug!(
            records = outcome.records.len(),
            skipped = outcome.skipped,
            "record load complete"
        );
        Ok(outcome)
    }

    async fn load_directory(&self, dir: &Path) -> Result<LoadOutcome, StoreError> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        files.sort();

        let results: Vec<Result<LoadOutcome, StoreError>> = stream::iter(files)
            .map(|path| async move { load_file(&path).await })
            .buffered(READ_CONCURRENCY)
            .collect()
            .await;

        let mut outcome = LoadOutcome::default();
        for result in results {
            match result {
                Ok(partial) => outcome.merge(partial),
                // One bad file in a directory must not sink the rest.
                Err(err) => warn!("skipping store file: {err}"),
            }
        }
        Ok(outcome)
    }

    async fn load_url(&self, url: &str) -> Result<LoadOutcome, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .build()
            .map_err(|source| StoreError::Http {
                url: url.to_string(),
                source,
            })?;

        let payload: Value = client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| StoreError::Http {
                url: url.to_string(),
                source,
            })?
            .json()
            .await
            .map_err(|source| StoreError::Http {
                url: url.to_string(),
                source,
            })?;

        Ok(parse_payload(payload))
    }
}

async fn load_file(path: &Path) -> Result<LoadOutcome, StoreError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let payload: Value = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    Ok(parse_payload(payload))
}

/// Accept a top-level array of records, an object wrapping a `submissions`
/// array, or a single record object.
fn parse_payload(payload: Value) -> LoadOutcome {
    let entries = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("submissions") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(map)],
        },
        other => {
            warn!("ignoring non-object record payload: {}", type_name(&other));
            return LoadOutcome {
                records: Vec::new(),
                skipped: 1,
            };
        }
    };

    let mut outcome = LoadOutcome::default();
    for entry in entries {
        if !entry.is_object() {
            outcome.skipped += 1;
            continue;
        }
        match serde_json::from_value(entry) {
            Ok(record) => outcome.records.push(record),
            Err(err) => {
                warn!("skipping malformed record: {err}");
                outcome.skipped += 1;
            }
        }
    }
    outcome
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Find a single record by id.
pub fn find_record(records: &[SubmissionRecord], id: i64) -> Result<&SubmissionRecord, StoreError> {
    records
        .iter()
        .find(|record| record.id == id)
        .ok_or(StoreError::RecordNotFound(id))
}
