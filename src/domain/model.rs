use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// 一筆原始 JSON 物件 (例如一則推文)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    /// Wraps a JSON object; any other JSON value lands under the `value` key.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(obj) => Self {
                data: obj.into_iter().collect(),
            },
            other => Self {
                data: HashMap::from([("value".to_string(), other)]),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

/// A successfully extracted value: a media URL or a recognized text.
pub type DerivedRecord = String;

/// Why a single item was skipped. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemFailure {
    #[error("missing field: {field}")]
    MissingField { field: String },

    #[error("extraction failed: {reason}")]
    ExtractionFailure { reason: String },
}

impl ItemFailure {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn extraction(reason: impl std::fmt::Display) -> Self {
        Self::ExtractionFailure {
            reason: reason.to_string(),
        }
    }
}

pub type ItemResult = std::result::Result<DerivedRecord, ItemFailure>;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub records: Vec<DerivedRecord>,
    pub failures: Vec<usize>,
    pub enumerated: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
