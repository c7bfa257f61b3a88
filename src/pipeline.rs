use crate::config::PipelineOptions;
use crate::schema::FieldMapping;

/// Entry point for the ingestion jobs. Each job is a method on this builder:
///
/// - `fetch_partitions`: source partitions -> raw bucket (one JSON shard per partition)
/// - `transform`: raw bucket -> staging bucket (drop fields, apply mapping, CSV)
/// - `merge_and_tag`: staging bucket -> one sentiment-tagged CSV
/// - `process_upload`: one uploaded CSV -> sentiment-tagged CSV response
#[derive(Clone, Debug, Default)]
pub struct RedditPipeline {
    pub(crate) opts: PipelineOptions,
}

impl RedditPipeline {
    pub fn new() -> Self {
        Self { opts: PipelineOptions::default() }
    }

    pub fn from_options(opts: PipelineOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn raw_bucket(mut self, b: impl Into<String>) -> Self { self.opts = self.opts.with_raw_bucket(b); self }
    pub fn staging_bucket(mut self, b: impl Into<String>) -> Self { self.opts = self.opts.with_staging_bucket(b); self }
    pub fn processed_bucket(mut self, b: impl Into<String>) -> Self { self.opts = self.opts.with_processed_bucket(b); self }
    pub fn source_prefix(mut self, p: impl Into<String>) -> Self { self.opts = self.opts.with_source_prefix(p); self }
    pub fn destination_key(mut self, k: impl Into<String>) -> Self { self.opts = self.opts.with_destination_key(k); self }
    pub fn upload_key(mut self, k: impl Into<String>) -> Self { self.opts = self.opts.with_upload_key(k); self }
    pub fn partitions<I, S>(mut self, names: I) -> Self where I: IntoIterator<Item = S>, S: AsRef<str> { self.opts = self.opts.with_partitions(names); self }
    pub fn fetch_limit(mut self, n: usize) -> Self { self.opts = self.opts.with_fetch_limit(n); self }
    pub fn fetch_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_fetch_concurrency(n); self }
    pub fn text_fields<I, S>(mut self, fields: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_text_fields(fields); self }
    pub fn mapping(mut self, mapping: FieldMapping) -> Self { self.opts = self.opts.with_mapping(mapping); self }
    pub fn drop_fields<I, S>(mut self, fields: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_drop_fields(fields); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
}
