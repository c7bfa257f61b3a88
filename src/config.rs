use crate::schema::{reddit_drop_fields, FieldMapping};
use crate::util::{normalize_partition_name, split_list};

/// Communities fetched by default.
pub const DEFAULT_PARTITIONS: [&str; 16] = [
    "Canada",
    "ImmigrationCanada",
    "CanadaPolitics",
    "onguardforthee",
    "metacanada",
    "CanadaHousing2",
    "Canada_sub",
    "PersonalFinanceCanada",
    "CostcoCanada",
    "CanadaUniversities",
    "MortgagesCanada",
    "AskACanadian",
    "ShopCanada",
    "CanadaPublicServants",
    "CanadaJobs",
    "canadahousing",
];

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub raw_bucket: String,           // fetch output, transform input
    pub staging_bucket: String,       // transform output, merge input
    pub processed_bucket: String,     // merged + tagged output
    pub source_prefix: String,        // transform listing prefix ("" = whole bucket)
    pub destination_key: String,      // merged artifact key
    pub upload_key: String,           // HTTP upload artifact key
    pub partitions: Vec<String>,      // named source partitions, in fetch order
    pub fetch_limit: usize,           // newest N items per partition
    pub fetch_concurrency: usize,     // 1 = sequential
    pub text_fields: Vec<String>,     // concatenated for sentiment analysis
    pub mapping: FieldMapping,
    pub drop_fields: Vec<String>,
    pub progress: bool,               // show progress bars
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            raw_bucket: "s3-raw-canbuddy-demo".to_string(),
            staging_bucket: "s3-staging-canbuddy-demo".to_string(),
            processed_bucket: "cs-nlp-processed".to_string(),
            source_prefix: String::new(),
            destination_key: "processed_data.csv".to_string(),
            upload_key: "processed_data.csv".to_string(),
            partitions: DEFAULT_PARTITIONS.iter().map(|s| s.to_string()).collect(),
            fetch_limit: 10,
            fetch_concurrency: 1,
            text_fields: vec!["title".to_string(), "selftext".to_string()],
            mapping: FieldMapping::reddit_default(),
            drop_fields: reddit_drop_fields(),
            progress: false,
        }
    }
}

impl PipelineOptions {
    /// Defaults overridden by recognized environment variables:
    /// `S3_BUCKET_NAME`/`RAW_BUCKET_NAME`, `SOURCE_BUCKET_NAME`, `DESTINATION_BUCKET_NAME`,
    /// `DESTINATION_FILE_KEY`, `PROCESSED_BUCKET_NAME`, `REDPULSE_PARTITIONS`,
    /// `REDPULSE_FETCH_LIMIT`, `REDPULSE_TEXT_FIELDS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` but reads through `get`.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut o = Self::default();
        let non_empty = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = non_empty("RAW_BUCKET_NAME").or_else(|| non_empty("S3_BUCKET_NAME")) {
            o.raw_bucket = v;
        }
        if let Some(v) = non_empty("SOURCE_BUCKET_NAME") {
            o.staging_bucket = v;
        }
        if let Some(v) = non_empty("DESTINATION_BUCKET_NAME") {
            o.processed_bucket = v;
        }
        if let Some(v) = non_empty("PROCESSED_BUCKET_NAME") {
            o.processed_bucket = v;
        }
        if let Some(v) = non_empty("DESTINATION_FILE_KEY") {
            o.destination_key = v;
        }
        if let Some(v) = non_empty("REDPULSE_PARTITIONS") {
            o = o.with_partitions(split_list(&v));
        }
        if let Some(v) = non_empty("REDPULSE_FETCH_LIMIT") {
            match v.parse::<usize>() {
                Ok(n) => o.fetch_limit = n,
                Err(_) => tracing::warn!("REDPULSE_FETCH_LIMIT is not a number: {}", v),
            }
        }
        if let Some(v) = non_empty("REDPULSE_TEXT_FIELDS") {
            o.text_fields = split_list(&v);
        }
        o
    }

    pub fn with_raw_bucket(mut self, b: impl Into<String>) -> Self {
        self.raw_bucket = b.into();
        self
    }
    pub fn with_staging_bucket(mut self, b: impl Into<String>) -> Self {
        self.staging_bucket = b.into();
        self
    }
    pub fn with_processed_bucket(mut self, b: impl Into<String>) -> Self {
        self.processed_bucket = b.into();
        self
    }
    pub fn with_source_prefix(mut self, p: impl Into<String>) -> Self {
        self.source_prefix = p.into();
        self
    }
    pub fn with_destination_key(mut self, k: impl Into<String>) -> Self {
        self.destination_key = k.into();
        self
    }
    pub fn with_upload_key(mut self, k: impl Into<String>) -> Self {
        self.upload_key = k.into();
        self
    }
    /// Names are trimmed and stripped of an `r/` prefix.
    pub fn with_partitions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.partitions = names.into_iter().map(|s| normalize_partition_name(s.as_ref())).collect();
        self
    }
    pub fn with_fetch_limit(mut self, n: usize) -> Self {
        self.fetch_limit = n;
        self
    }
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }
    pub fn with_text_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_fields = fields.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }
    pub fn with_drop_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_fields = fields.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
}
