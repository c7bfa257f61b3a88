//! Merge-and-tag job: every staged CSV -> one sentiment-tagged CSV in the processed bucket.

use crate::dataset::{merge, Dataset, Merged};
use crate::error::Result;
use crate::normalize::normalize_all;
use crate::pipeline::RedditPipeline;
use crate::progress::ProgressScope;
use crate::record::EnrichedRecord;
use crate::sentiment::{Enricher, Sentiment};
use crate::store::{ObjectStore, CONTENT_TYPE_CSV};
use crate::tabular::{decode_csv, encode_enriched};
use crate::util::init_tracing_once;
use rayon::prelude::*;
use serde::Serialize;

pub const MERGE_OK: &str = "CSV-like files merged and uploaded as CSV successfully.";
pub const MERGE_EMPTY: &str = "No CSV-like files found in the source bucket.";

/// Function-style response: `{"statusCode": 200, "body": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub status_code: u16,
    pub body: String,
}

impl JobResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status_code: 200, body: body.into() }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self { status_code: 500, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"statusCode\":{}}}", self.status_code))
    }
}

/// What a successful merge wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub rows: usize,
    pub skipped_rows: usize,
    pub errored_rows: usize,
    /// `None` when the staging bucket was empty and nothing was written.
    pub destination: Option<String>,
}

impl RedditPipeline {
    /// Merge, enrich and upload. Never panics or propagates: faults become a 500 response.
    pub fn merge_and_tag(&self, store: &dyn ObjectStore, enricher: &Enricher) -> JobResponse {
        init_tracing_once();
        match self.try_merge_and_tag(store, enricher) {
            Ok(summary) if summary.destination.is_none() => JobResponse::ok(MERGE_EMPTY),
            Ok(summary) => {
                tracing::info!(
                    "Merged {} files ({} rows, {} sentiment errors) into {}.",
                    summary.files,
                    summary.rows,
                    summary.errored_rows,
                    summary.destination.as_deref().unwrap_or_default()
                );
                JobResponse::ok(MERGE_OK)
            }
            Err(e) => {
                tracing::error!("merge_and_tag failed: {}", e);
                JobResponse::error(format!("Error merging and uploading CSV-like files: {e}"))
            }
        }
    }

    /// Same job with the typed error instead of a response envelope.
    pub fn try_merge_and_tag(&self, store: &dyn ObjectStore, enricher: &Enricher) -> Result<MergeSummary> {
        let keys = store.list(&self.opts.staging_bucket, "")?;
        if keys.is_empty() {
            tracing::info!("No staged files in {}.", self.opts.staging_bucket);
            return Ok(MergeSummary::default());
        }

        let mut summary = MergeSummary { files: keys.len(), ..Default::default() };
        let pb = ProgressScope::count(self.opts.progress, "Tag staged files", keys.len() as u64);
        let mut shards = Vec::with_capacity(keys.len());
        for key in &keys {
            let bytes = store.get(&self.opts.staging_bucket, key)?;
            let table = decode_csv(&bytes)?;
            let mapping = self.opts.mapping.staged_for_header(&table.headers)?;

            let (records, failed) = normalize_all(&table.records, &mapping);
            for (row, e) in &failed {
                tracing::warn!(key = %key, row, "skipping staged row: {}", e);
            }
            summary.skipped_rows += failed.len();

            let text_fields = &self.opts.text_fields;
            let enriched: Vec<EnrichedRecord> =
                records.into_par_iter().map(|r| enricher.enrich(r, text_fields)).collect();
            shards.push(Dataset::new(table.headers, enriched));
            pb.inc(1);
        }
        pb.finish("done");

        let dataset = match merge(shards)? {
            Merged::Empty => return Ok(MergeSummary::default()),
            Merged::Rows(d) => d,
        };
        summary.rows = dataset.len();
        summary.errored_rows = dataset.rows.iter().filter(|r| r.sentiment == Sentiment::Error).count();

        let body = encode_enriched(&dataset.columns, &dataset.rows)?;
        store
            .put(&self.opts.processed_bucket, &self.opts.destination_key, &body, CONTENT_TYPE_CSV)?;
        summary.destination = Some(format!("{}/{}", self.opts.processed_bucket, self.opts.destination_key));
        Ok(summary)
    }
}
