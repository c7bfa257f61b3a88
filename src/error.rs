//! Error taxonomy. Field, scorer and partition faults are isolated by the stage that
//! raises them; only `PipelineError` aborts an invocation.

use crate::schema::TargetType;
use thiserror::Error;

/// Per-field conversion failure. Fails the record, never the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("cannot cast field `{field}` value {value:?} to {target_type}")]
    CastFailure {
        field: String,
        target_type: TargetType,
        value: String,
    },
}

/// Enrichment backend failure. Downgraded to a sentinel `error` record by the enricher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScorerFault {
    #[error("scorer unavailable: {0}")]
    Unavailable(String),
    #[error("scorer backend error: {0}")]
    Backend(String),
}

/// Partition-level fetch failure. Recorded per partition; siblings keep going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionFault {
    #[error("Access to r/{partition} is Forbidden: {reason}")]
    Forbidden { partition: String, reason: String },
    #[error("Error accessing r/{partition}: not found: {reason}")]
    NotFound { partition: String, reason: String },
    #[error("Error accessing r/{partition}: invalid partition name")]
    Invalid { partition: String },
    #[error("Error accessing r/{partition}: {reason}")]
    Backend { partition: String, reason: String },
}

impl PartitionFault {
    pub fn partition(&self) -> &str {
        match self {
            PartitionFault::Forbidden { partition, .. }
            | PartitionFault::NotFound { partition, .. }
            | PartitionFault::Invalid { partition }
            | PartitionFault::Backend { partition, .. } => partition,
        }
    }
}

/// Object-store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object s3://{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invocation-level failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema mismatch: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("missing required columns: {}", .0.join(", "))]
    MissingRequiredColumn(Vec<String>),
    #[error("duplicate target field `{0}` in mapping")]
    DuplicateTarget(String),
    #[error("staged key `{key}` already written from `{first}`")]
    StagedKeyCollision { key: String, first: String },
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("invalid value {value:?} in column `{column}`")]
    InvalidColumnValue { column: String, value: String },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
