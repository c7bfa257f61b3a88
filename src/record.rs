//! Record shapes flowing through the pipeline:
//! `RawRecord` -> `NormalizedRecord` -> `EnrichedRecord`.

use crate::sentiment::Sentiment;
use serde_json::Value;
use std::fmt;

/// One ingested item: field name to untyped JSON scalar (string, number, bool or null).
/// Insertion order is the source order.
pub type RawRecord = serde_json::Map<String, Value>;

/// Columns appended after the declared schema columns by the enricher.
pub const ENRICHMENT_COLUMNS: [&str; 4] =
    ["sentiment", "sentiment_score", "sentiment_magnitude", "key_phrases"];

/// A value cast to its declared target type.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Decimal(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Decimal(n) => Some(*n),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Decimal(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Record restricted to a mapping's target names, in declaration order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NormalizedRecord {
    fields: Vec<(String, FieldValue)>,
}

impl NormalizedRecord {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { fields: Vec::with_capacity(n) }
    }

    pub(crate) fn push(&mut self, name: String, value: FieldValue) {
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Cell text for each of `columns`; unknown columns are empty.
    pub fn row(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A normalized record plus derived sentiment fields. Always present, even when
/// the scorer failed (then `sentiment == Sentiment::Error` and numerics are zero).
#[derive(Clone, Debug, PartialEq)]
pub struct EnrichedRecord {
    pub record: NormalizedRecord,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub sentiment_magnitude: f64,
    pub key_phrases: String,
}

impl EnrichedRecord {
    /// Values for `columns` (looked up by name, missing as empty), then `ENRICHMENT_COLUMNS`.
    pub fn to_row(&self, columns: &[String]) -> Vec<String> {
        let mut row = self.record.row(columns);
        row.push(self.sentiment.to_string());
        row.push(self.sentiment_score.to_string());
        row.push(self.sentiment_magnitude.to_string());
        row.push(self.key_phrases.clone());
        row
    }
}
