//! Batch transform job: raw bucket -> staging bucket.
//!
//! Every object under the configured prefix is decoded, stripped of the drop list,
//! normalized through the mapping and written back as one CSV per object.

use crate::error::{FieldError, PipelineError};
use crate::normalize::{drop_fields, normalize_all};
use crate::pipeline::RedditPipeline;
use crate::progress::ProgressScope;
use crate::store::{ObjectStore, CONTENT_TYPE_CSV};
use crate::tabular::{decode_object, encode_normalized, strip_zst};
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use std::collections::HashMap;

/// A row that failed normalization; the rest of its object is still written.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub key: String,
    pub row: usize,
    pub error: FieldError,
}

/// An object that could not be read, decoded or written.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectFailure {
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenObject {
    pub source_key: String,
    pub staged_key: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    pub written: Vec<WrittenObject>,
    /// Objects that decoded fine but produced no rows; nothing was written for them.
    pub skipped: Vec<String>,
    pub record_failures: Vec<RecordFailure>,
    pub object_failures: Vec<ObjectFailure>,
}

impl TransformReport {
    pub fn rows_written(&self) -> usize {
        self.written.iter().map(|w| w.rows).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.record_failures.is_empty() && self.object_failures.is_empty()
    }
}

/// `a/b/x.json.zst` -> `a/b/x.csv`
pub fn staged_key(key: &str) -> String {
    let base = strip_zst(key).1;
    let file_start = base.rfind('/').map(|i| i + 1).unwrap_or(0);
    let stem = match base[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &base[..file_start + dot],
        _ => base,
    };
    format!("{stem}.csv")
}

enum ObjectOutcome {
    Written(WrittenObject),
    Skipped,
}

impl RedditPipeline {
    /// Run the transform over every object currently in the raw bucket. Listing
    /// failures abort; per-object and per-record failures are itemized.
    ///
    /// Keys are processed in listing order. When two raw keys map to the same staged
    /// key the first one wins and the later one is reported as an object failure.
    pub fn transform(&self, store: &dyn ObjectStore) -> Result<TransformReport> {
        init_tracing_once();
        let keys = store
            .list(&self.opts.raw_bucket, &self.opts.source_prefix)
            .with_context(|| format!("listing s3://{}/{}", self.opts.raw_bucket, self.opts.source_prefix))?;
        tracing::info!("Found {} objects to transform in {}.", keys.len(), self.opts.raw_bucket);

        let mut report = TransformReport::default();
        // staged key -> raw key that wrote it
        let mut claimed: HashMap<String, String> = HashMap::new();
        let pb = ProgressScope::count(self.opts.progress, "Transform objects", keys.len() as u64);
        for key in &keys {
            match self.transform_object(store, key, &claimed, &mut report.record_failures) {
                Ok(ObjectOutcome::Written(w)) => {
                    claimed.insert(w.staged_key.clone(), w.source_key.clone());
                    report.written.push(w);
                }
                Ok(ObjectOutcome::Skipped) => report.skipped.push(key.clone()),
                Err(e) => {
                    tracing::warn!(key = %key, "object failed: {}", e);
                    report.object_failures.push(ObjectFailure { key: key.clone(), message: e.to_string() });
                }
            }
            pb.inc(1);
        }
        pb.finish("done");

        tracing::info!(
            "Transform wrote {} objects ({} rows); {} skipped, {} record failures, {} object failures.",
            report.written.len(),
            report.rows_written(),
            report.skipped.len(),
            report.record_failures.len(),
            report.object_failures.len()
        );
        Ok(report)
    }

    fn transform_object(
        &self,
        store: &dyn ObjectStore,
        key: &str,
        claimed: &HashMap<String, String>,
        record_failures: &mut Vec<RecordFailure>,
    ) -> Result<ObjectOutcome, PipelineError> {
        let out_key = staged_key(key);
        if let Some(first) = claimed.get(&out_key) {
            return Err(PipelineError::StagedKeyCollision { key: out_key, first: first.clone() });
        }
        let bytes = store.get(&self.opts.raw_bucket, key)?;
        let mut raws = decode_object(key, &bytes)?;
        for raw in raws.iter_mut() {
            drop_fields(raw, &self.opts.drop_fields);
        }

        let (records, failed) = normalize_all(&raws, &self.opts.mapping);
        for (row, error) in failed {
            tracing::debug!(key, row, "record failed: {}", error);
            record_failures.push(RecordFailure { key: key.to_string(), row, error });
        }
        if records.is_empty() {
            return Ok(ObjectOutcome::Skipped);
        }

        let columns = self.opts.mapping.target_names();
        let body = encode_normalized(&columns, &records)?;
        store.put(&self.opts.staging_bucket, &out_key, &body, CONTENT_TYPE_CSV)?;
        Ok(ObjectOutcome::Written(WrittenObject {
            source_key: key.to_string(),
            staged_key: out_key,
            rows: records.len(),
        }))
    }
}

