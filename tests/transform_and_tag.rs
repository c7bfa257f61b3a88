#[path = "common/mod.rs"]
mod common;

use common::{csv_rows, submission, write_ndjson_partition, zst_lines, FailingScorer};
use redpulse::{
    encode_json_records, staged_key, Enricher, FieldMapping, FsStore, MemoryStore, NdjsonDirSource, ObjectStore,
    RedditPipeline, StaticSource, CONTENT_TYPE_CSV, CONTENT_TYPE_JSON, ENRICHMENT_COLUMNS, MERGE_EMPTY, MERGE_OK,
};
use serde_json::json;
use std::sync::Arc;

const RAW: &str = "raw";
const STAGING: &str = "staging";
const PROCESSED: &str = "processed";

fn pipeline() -> RedditPipeline {
    RedditPipeline::new()
        .raw_bucket(RAW)
        .staging_bucket(STAGING)
        .processed_bucket(PROCESSED)
        .destination_key("merged/processed_data.csv")
}

/// Raw bucket with: one JSON shard with a bad row, one zstd NDJSON dump, one
/// undecodable object and one empty shard.
fn seeded_raw_store() -> MemoryStore {
    let store = MemoryStore::new();

    let mut bad = submission("Canada", "Bad row", "", 0);
    bad.insert("score".into(), json!("lots"));
    let canada = vec![submission("Canada", "Good news", "", 10), bad];
    store.put(RAW, "Canada/Canada_data.json", &encode_json_records(&canada).unwrap(), CONTENT_TYPE_JSON).unwrap();

    let lines: Vec<String> = ["Rent is terrible", "Lovely weather"]
        .iter()
        .map(|t| serde_json::to_string(&submission("Ontario", t, "", 1)).unwrap())
        .collect();
    store.put(RAW, "Ontario/dump.ndjson.zst", &zst_lines(&lines), "application/zstd").unwrap();

    store.put(RAW, "broken/bad.json", b"{not json", CONTENT_TYPE_JSON).unwrap();
    store.put(RAW, "empty/none.json", b"[]", CONTENT_TYPE_JSON).unwrap();
    store
}

#[test]
fn transform_writes_one_staged_csv_per_object() {
    let store = seeded_raw_store();
    let report = pipeline().transform(&store).unwrap();

    let staged: Vec<(&str, usize)> = report.written.iter().map(|w| (w.staged_key.as_str(), w.rows)).collect();
    assert_eq!(staged, vec![("Canada/Canada_data.csv", 1), ("Ontario/dump.csv", 2)]);
    assert_eq!(report.rows_written(), 3);
    assert_eq!(report.skipped, vec!["empty/none.json".to_string()]);
    assert!(!report.is_clean());

    assert_eq!(report.record_failures.len(), 1);
    assert_eq!(report.record_failures[0].key, "Canada/Canada_data.json");
    assert_eq!(report.record_failures[0].row, 1);

    assert_eq!(report.object_failures.len(), 1);
    assert_eq!(report.object_failures[0].key, "broken/bad.json");

    let obj = store.object(STAGING, "Canada/Canada_data.csv").unwrap();
    assert_eq!(obj.content_type, CONTENT_TYPE_CSV);
    let (headers, rows) = csv_rows(&obj.bytes);
    assert_eq!(headers, FieldMapping::reddit_default().target_names());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Good news");
    assert_eq!(rows[0]["score"], "10");
    assert!(!headers.contains(&"author".to_string()), "dropped fields never reach staging");
}

#[test]
fn transform_respects_source_prefix() {
    let store = seeded_raw_store();
    let report = pipeline().source_prefix("Ontario/").transform(&store).unwrap();
    assert_eq!(report.written.len(), 1);
    assert!(report.is_clean());
    assert_eq!(store.list(STAGING, "").unwrap(), vec!["Ontario/dump.csv".to_string()]);
}

#[test]
fn staged_keys_swap_the_extension() {
    assert_eq!(staged_key("Canada/Canada_data.json"), "Canada/Canada_data.csv");
    assert_eq!(staged_key("a/b.ndjson.zst"), "a/b.csv");
    assert_eq!(staged_key("a.b/noext"), "a.b/noext.csv");
    assert_eq!(staged_key("x.csv"), "x.csv");
    assert_eq!(staged_key("a/b.JSON.ZST"), "a/b.csv");
}

#[test]
fn colliding_staged_keys_keep_the_first_object() {
    let store = MemoryStore::new();
    let from_json = vec![submission("Canada", "from json", "", 1)];
    store.put(RAW, "Canada/data.json", &encode_json_records(&from_json).unwrap(), CONTENT_TYPE_JSON).unwrap();
    store.put(RAW, "Canada/data.csv", b"title,score\nfrom csv,2\n", CONTENT_TYPE_CSV).unwrap();

    let report = pipeline().transform(&store).unwrap();
    assert_eq!(report.written.len(), 1);
    assert_eq!(report.written[0].source_key, "Canada/data.csv");
    assert_eq!(report.rows_written(), 1);
    assert!(!report.is_clean());

    assert_eq!(report.object_failures.len(), 1);
    assert_eq!(report.object_failures[0].key, "Canada/data.json");
    assert!(report.object_failures[0].message.contains("Canada/data.csv"), "{}", report.object_failures[0].message);

    assert_eq!(store.list(STAGING, "").unwrap(), vec!["Canada/data.csv".to_string()]);
    let (_, rows) = csv_rows(&store.get(STAGING, "Canada/data.csv").unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "from csv");
}

#[test]
fn merge_and_tag_produces_one_tagged_csv() {
    let store = seeded_raw_store();
    let p = pipeline();
    p.transform(&store).unwrap();

    let resp = p.merge_and_tag(&store, &Enricher::lexicon());
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body, MERGE_OK);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&resp.to_json()).unwrap(),
        json!({"statusCode": 200, "body": MERGE_OK})
    );

    let obj = store.object(PROCESSED, "merged/processed_data.csv").expect("merged artifact");
    assert_eq!(obj.content_type, CONTENT_TYPE_CSV);
    let (headers, rows) = csv_rows(&obj.bytes);
    let mut expected = FieldMapping::reddit_default().target_names();
    expected.extend(ENRICHMENT_COLUMNS.iter().map(|s| s.to_string()));
    assert_eq!(headers, expected);

    let titles: Vec<&str> = rows.iter().map(|r| r["title"].as_str()).collect();
    assert_eq!(titles, vec!["Good news", "Rent is terrible", "Lovely weather"]);
    let classes: Vec<&str> = rows.iter().map(|r| r["sentiment"].as_str()).collect();
    assert_eq!(classes, vec!["positive", "negative", "neutral"]);
    assert_eq!(rows[1]["key_phrases"], "Rent, is");
}

#[test]
fn merge_and_tag_on_empty_staging_writes_nothing() {
    let store = MemoryStore::new();
    let resp = pipeline().merge_and_tag(&store, &Enricher::lexicon());
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body, MERGE_EMPTY);
    assert!(store.is_empty());
}

#[test]
fn merge_and_tag_rejects_mismatched_staged_files() {
    let store = MemoryStore::new();
    store.put(STAGING, "a.csv", b"title,selftext\nhello,there\n", CONTENT_TYPE_CSV).unwrap();
    store.put(STAGING, "b.csv", b"title,body\nhi,again\n", CONTENT_TYPE_CSV).unwrap();

    let resp = pipeline().merge_and_tag(&store, &Enricher::lexicon());
    assert_eq!(resp.status_code, 500);
    assert!(
        resp.body.starts_with("Error merging and uploading CSV-like files: schema mismatch"),
        "{}",
        resp.body
    );
    assert!(store.object(PROCESSED, "merged/processed_data.csv").is_none(), "nothing partially persisted");
}

#[test]
fn merge_and_tag_isolates_row_and_scorer_faults() {
    let store = MemoryStore::new();
    store
        .put(STAGING, "a.csv", b"title,selftext,score\nfirst,,1\nsecond,,many\nthird,,3\n", CONTENT_TYPE_CSV)
        .unwrap();

    let summary = pipeline().try_merge_and_tag(&store, &Enricher::new(Arc::new(FailingScorer))).unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.errored_rows, 2);

    let (_, rows) = csv_rows(&store.object(PROCESSED, "merged/processed_data.csv").unwrap().bytes);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["sentiment"] == "error" && r["sentiment_magnitude"] == "0"));
}

/// Fetch -> transform -> merge over the filesystem-backed store.
#[test]
fn end_to_end_on_the_filesystem() {
    let tmp = tempfile::tempdir().unwrap();
    let sources = tmp.path().join("sources");
    write_ndjson_partition(&sources, "Canada", &[submission("Canada", "Great day", "", 4)]);
    write_ndjson_partition(&sources, "CanadaJobs", &[submission("CanadaJobs", "Job market", "is awful", 2)]);

    let store = FsStore::new(tmp.path().join("buckets"));
    let p = pipeline().partitions(["Canada", "CanadaJobs"]);

    let fetched = p.fetch_partitions(&NdjsonDirSource::new(&sources), &store);
    assert_eq!(fetched.status_code(), 200);
    assert!(tmp.path().join("buckets").join(RAW).join("Canada").join("Canada_data.json").is_file());

    let report = p.transform(&store).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.written.len(), 2);

    let resp = p.merge_and_tag(&store, &Enricher::lexicon());
    assert_eq!(resp.body, MERGE_OK);

    let merged = store.get(PROCESSED, "merged/processed_data.csv").unwrap();
    let (_, rows) = csv_rows(&merged);
    let pairs: Vec<(&str, &str)> = rows.iter().map(|r| (r["subreddit"].as_str(), r["sentiment"].as_str())).collect();
    assert_eq!(pairs, vec![("Canada", "positive"), ("CanadaJobs", "negative")]);

    // A static source works against the same store too.
    let again = p.fetch_partitions(&StaticSource::new(), &store);
    assert_eq!(again.failures().count(), 2);
}
