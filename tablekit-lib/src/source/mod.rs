//! Record retrieval.
//!
//! The engine never fetches data itself. A [`RecordSource`] supplies the
//! full record collection and [`TableSession::load`](crate::session::TableSession::load)
//! swaps it in. Three sources are provided:
//!
//! - [`StaticSource`] - records already in memory
//! - [`JsonFileSource`] - a JSON file on disk
//! - [`HttpSource`] - a JSON endpoint fetched over HTTP(S)
//!
//! All of them accept the same payload shapes, see [`parse_records`].

mod http;

pub use http::HttpSource;

use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::Record;

/// Keys checked, in order, for a record list wrapped in an object.
const ENVELOPE_KEYS: [&str; 3] = ["data", "records", "items"];

/// Supplies the record collection of a table.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches every record.
    async fn fetch(&self) -> Result<Vec<Record>, SourceError>;

    /// Short description for log output.
    fn describe(&self) -> String;
}

/// Parses a JSON payload into records.
///
/// The payload is either an array of objects or an object wrapping one under
/// `data`, `records` or `items`.
///
/// ```
/// use tablekit_lib::source::parse_records;
///
/// let records = parse_records(r#"{"data": [{"id": 1}, {"id": 2}]}"#).unwrap();
/// assert_eq!(records.len(), 2);
/// ```
pub fn parse_records(payload: &str) -> Result<Vec<Record>, SourceError> {
    records_from_json(serde_json::from_str(payload)?)
}

/// Converts an already parsed JSON payload into records.
pub fn records_from_json(json: serde_json::Value) -> Result<Vec<Record>, SourceError> {
    let items = match json {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => {
            let list = ENVELOPE_KEYS
                .iter()
                .find_map(|key| match obj.remove(*key) {
                    Some(serde_json::Value::Array(items)) => Some(items),
                    _ => None,
                });
            list.ok_or_else(|| {
                SourceError::shape(format!(
                    "expected an array of records or an object with one of {ENVELOPE_KEYS:?}"
                ))
            })?
        }
        other => {
            return Err(SourceError::shape(format!(
                "expected an array of records, got {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(obj) => Ok(Record::from(obj)),
            other => Err(SourceError::shape(format!(
                "record {i} is {}, expected an object",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} static records", self.records.len())
    }
}

/// Records read from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        let payload = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::io(&self.path, e))?;
        parse_records(&payload)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
