mod config;
mod error;
mod schema;
mod record;
mod normalize;

mod sentiment;
mod lexicon;
mod dataset;
mod tabular;

mod store;
mod source;
mod ndjson;
mod progress;
mod concurrency;
mod util;

mod pipeline;
mod fetch;
mod transform;
mod tagging;
mod http;

pub use crate::config::{PipelineOptions, DEFAULT_PARTITIONS};
pub use crate::error::{FieldError, PartitionFault, PipelineError, ScorerFault, StoreError};
pub use crate::pipeline::RedditPipeline;

// schema + record model
pub use crate::schema::{reddit_drop_fields, FieldMapping, FieldSpec, TargetType};
pub use crate::record::{EnrichedRecord, FieldValue, NormalizedRecord, RawRecord, ENRICHMENT_COLUMNS};
pub use crate::normalize::{cast_value, drop_fields, normalize, normalize_all, parse_bool, zero_value};

// enrichment capabilities and the built-in lexicon backend
pub use crate::sentiment::{
    analysis_text, classify, key_phrases, Enricher, PartOfSpeech, Polarity, Sentiment, SentimentScorer,
    SyntaxAnalyzer, Token,
};
pub use crate::lexicon::{LexiconScorer, LexiconTagger};

pub use crate::dataset::{merge, Dataset, Merged};

// codecs
pub use crate::tabular::{
    decode_csv, decode_enriched, decode_json_records, decode_object, encode_enriched, encode_json_records,
    encode_normalized, CsvTable, ObjectFormat,
};

// external collaborators
pub use crate::store::{FsStore, MemoryStore, ObjectStore, StoredObject, CONTENT_TYPE_CSV, CONTENT_TYPE_JSON};
pub use crate::source::{InjectedFault, NdjsonDirSource, PostSource, RecordIter, StaticSource};

// jobs
pub use crate::fetch::{
    project_submission, shard_key, FetchReport, JobStatus, PartitionOutcome, PartitionResult, SUBMISSION_FIELDS,
};
pub use crate::transform::{staged_key, ObjectFailure, RecordFailure, TransformReport, WrittenObject};
pub use crate::tagging::{JobResponse, MergeSummary, MERGE_EMPTY, MERGE_OK};
pub use crate::http::{HttpResponse, UploadRequest, CONTENT_TYPE_TEXT};

// Expose multiprogress and progress helpers.
pub use crate::progress::{make_count_progress, set_global_multiprogress, ProgressScope};

pub use crate::concurrency::map_limited;

// export NDJSON helpers
pub use crate::ndjson::{NdjsonReader, NdjsonWriter};

//export robust file ops from util so binaries can import from crate root.
pub use crate::util::{
    create_with_backoff, init_tracing_once, is_valid_partition_name, normalize_partition_name, open_with_backoff,
    remove_with_backoff, replace_file_atomic_backoff,
};
