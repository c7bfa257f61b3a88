//! Fetch job: read the newest posts of each partition and write one JSON shard per
//! partition to the raw bucket. Partitions fail independently.

use crate::concurrency::map_limited;
use crate::error::PartitionFault;
use crate::pipeline::RedditPipeline;
use crate::progress::ProgressScope;
use crate::record::RawRecord;
use crate::source::PostSource;
use crate::store::{ObjectStore, CONTENT_TYPE_JSON};
use crate::tabular::encode_json_records;
use crate::util::{init_tracing_once, is_valid_partition_name};
use serde::Serialize;
use serde_json::Value;

/// Fields kept for every fetched submission, in output order.
pub const SUBMISSION_FIELDS: [&str; 28] = [
    "subreddit",
    "title",
    "selftext",
    "score",
    "num_comments",
    "created_utc",
    "author",
    "url",
    "permalink",
    "upvote_ratio",
    "thumbnail",
    "subreddit_subscribers",
    "link_flair_text",
    "is_video",
    "domain",
    "author_fullname",
    "link_flair_richtext",
    "pwls",
    "gilded",
    "thumbnail_height",
    "thumbnail_width",
    "total_awards_received",
    "is_original_content",
    "link_flair_type",
    "allow_live_comments",
    "is_self",
    "ups",
    "downs",
];

/// Project an API item onto `SUBMISSION_FIELDS`. Absent fields are null;
/// `subreddit` is always the partition name.
pub fn project_submission(partition: &str, item: &RawRecord) -> RawRecord {
    let mut out = RawRecord::new();
    for field in SUBMISSION_FIELDS {
        let v = if field == "subreddit" {
            Value::String(partition.to_string())
        } else {
            item.get(field).cloned().unwrap_or(Value::Null)
        };
        out.insert(field.to_string(), v);
    }
    out
}

/// Key of a partition's shard in the raw bucket.
pub fn shard_key(partition: &str) -> String {
    format!("{partition}/{partition}_data.json")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PartitionOutcome {
    Success { file_key: String },
    Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartitionResult {
    #[serde(rename = "subreddit")]
    pub partition: String,
    #[serde(skip)]
    pub records: usize,
    #[serde(flatten)]
    pub outcome: PartitionOutcome,
}

impl PartitionResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PartitionOutcome::Success { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Success,
    PartialFailure,
}

/// Itemized per-partition outcome of a fetch run, in configured partition order.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchReport {
    pub results: Vec<PartitionResult>,
}

impl FetchReport {
    pub fn status(&self) -> JobStatus {
        if self.results.iter().all(PartitionResult::is_success) {
            JobStatus::Success
        } else {
            JobStatus::PartialFailure
        }
    }

    /// 200 when every partition succeeded, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self.status() {
            JobStatus::Success => 200,
            JobStatus::PartialFailure => 500,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &PartitionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn successes(&self) -> impl Iterator<Item = &PartitionResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// `{"results": [{"subreddit": .., "status": "success"|"error", ..}, ..]}`
    pub fn body(&self) -> String {
        serde_json::json!({ "results": self.results }).to_string()
    }
}

impl RedditPipeline {
    /// Fetch every configured partition and write its shard. Never aborts on a
    /// single partition: faults are itemized in the report.
    pub fn fetch_partitions(&self, source: &dyn PostSource, store: &dyn ObjectStore) -> FetchReport {
        init_tracing_once();
        let partitions = &self.opts.partitions;
        tracing::info!("Planned {} partitions for fetch (limit {} each).", partitions.len(), self.opts.fetch_limit);

        let pb = ProgressScope::count(self.opts.progress, "Fetch partitions", partitions.len() as u64);
        let results = map_limited(partitions, self.opts.fetch_concurrency, |name| {
            let res = self.fetch_one(source, store, name);
            pb.inc(1);
            res
        });
        pb.finish("done");

        let report = FetchReport { results };
        for f in report.failures() {
            if let PartitionOutcome::Error { message } = &f.outcome {
                tracing::warn!(partition = %f.partition, "{}", message);
            }
        }
        report
    }

    fn fetch_one(&self, source: &dyn PostSource, store: &dyn ObjectStore, name: &str) -> PartitionResult {
        let result = (|| -> Result<(String, usize), String> {
            if !is_valid_partition_name(name) {
                return Err(PartitionFault::Invalid { partition: name.to_string() }.to_string());
            }
            let items = source
                .fetch_partition(name, self.opts.fetch_limit)
                .map_err(|e| e.to_string())?;
            // A fault mid-stream fails the whole partition; nothing is written.
            let records = items
                .map(|item| item.map(|raw| project_submission(name, &raw)))
                .collect::<Result<Vec<_>, PartitionFault>>()
                .map_err(|e| e.to_string())?;

            let key = shard_key(name);
            let body = encode_json_records(&records)
                .map_err(|e| format!("Error accessing r/{name}: {e}"))?;
            store
                .put(&self.opts.raw_bucket, &key, &body, CONTENT_TYPE_JSON)
                .map_err(|e| format!("Error accessing r/{name}: {e}"))?;
            Ok((key, records.len()))
        })();

        match result {
            Ok((file_key, records)) => {
                tracing::debug!(partition = name, records, "partition written");
                PartitionResult { partition: name.to_string(), records, outcome: PartitionOutcome::Success { file_key } }
            }
            Err(message) => PartitionResult { partition: name.to_string(), records: 0, outcome: PartitionOutcome::Error { message } },
        }
    }
}
