#[path = "common/mod.rs"]
mod common;

use common::write_file;
use redpulse::{
    is_valid_partition_name, normalize_partition_name, FsStore, MemoryStore, ObjectStore, PipelineOptions,
    StoreError, DEFAULT_PARTITIONS,
};
use std::collections::HashMap;

#[test]
fn memory_store_round_trip_and_listing() {
    let store = MemoryStore::new();
    store.put("b", "x/1.csv", b"one", "text/csv").unwrap();
    store.put("b", "x/2.csv", b"two", "text/csv").unwrap();
    store.put("b", "y/3.csv", b"three", "text/csv").unwrap();
    store.put("other", "x/9.csv", b"nine", "text/csv").unwrap();

    assert_eq!(store.list("b", "x/").unwrap(), vec!["x/1.csv", "x/2.csv"]);
    assert_eq!(store.list("b", "").unwrap().len(), 3);
    assert_eq!(store.get("b", "y/3.csv").unwrap(), b"three");

    store.put("b", "y/3.csv", b"3", "text/plain").unwrap();
    let obj = store.object("b", "y/3.csv").unwrap();
    assert_eq!(obj.bytes, b"3");
    assert_eq!(obj.content_type, "text/plain");

    assert!(matches!(store.get("b", "missing"), Err(StoreError::NotFound { .. })));
    assert!(matches!(store.put("b", "../escape", b"", "text/csv"), Err(StoreError::InvalidKey(_))));
}

#[test]
fn fs_store_lists_recursively_and_replaces_atomically() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsStore::new(tmp.path());

    store.put("raw", "Canada/Canada_data.json", b"[]", "application/json").unwrap();
    store.put("raw", "Ontario/deep/dump.json", b"[1]", "application/json").unwrap();
    store.put("raw", "Canada/Canada_data.json", b"[2]", "application/json").unwrap();
    // Leftover temp files from an interrupted write are invisible.
    write_file(&tmp.path().join("raw").join("Canada").join("x.json.inprogress"), b"partial");

    assert_eq!(
        store.list("raw", "").unwrap(),
        vec!["Canada/Canada_data.json", "Ontario/deep/dump.json"]
    );
    assert_eq!(store.list("raw", "Ontario/").unwrap(), vec!["Ontario/deep/dump.json"]);
    assert_eq!(store.get("raw", "Canada/Canada_data.json").unwrap(), b"[2]");
    assert!(store.list("nothing-here", "").unwrap().is_empty());

    assert!(matches!(store.get("raw", "nope.json"), Err(StoreError::NotFound { .. })));
    assert!(matches!(store.put("raw", "/abs", b"", "text/csv"), Err(StoreError::InvalidKey(_))));
    assert!(matches!(store.put("..", "k", b"", "text/csv"), Err(StoreError::InvalidKey(_))));
}

#[test]
fn partition_names() {
    assert_eq!(normalize_partition_name(" r/Canada "), "Canada");
    assert_eq!(normalize_partition_name("/r/AskACanadian/"), "AskACanadian");
    assert_eq!(normalize_partition_name("CanadaJobs"), "CanadaJobs");

    assert!(DEFAULT_PARTITIONS.iter().all(|p| is_valid_partition_name(p)));
    assert!(!is_valid_partition_name("a"));
    assert!(!is_valid_partition_name("has space"));
    assert!(!is_valid_partition_name("waaaaaaaaaaaaaaaaaaaytoolong"));
}

#[test]
fn options_defaults() {
    let o = PipelineOptions::default();
    assert_eq!(o.partitions.len(), 16);
    assert_eq!(o.fetch_limit, 10);
    assert_eq!(o.fetch_concurrency, 1);
    assert_eq!(o.text_fields, vec!["title", "selftext"]);
    assert_eq!(o.destination_key, "processed_data.csv");
    assert_eq!(o.mapping.len(), 13);
}

#[test]
fn options_from_lookup() {
    let env: HashMap<&str, &str> = [
        ("S3_BUCKET_NAME", "raw-b"),
        ("SOURCE_BUCKET_NAME", "stage-b"),
        ("DESTINATION_BUCKET_NAME", "dest-b"),
        ("DESTINATION_FILE_KEY", "out/merged.csv"),
        ("REDPULSE_PARTITIONS", "r/Canada, AskACanadian;CanadaJobs"),
        ("REDPULSE_FETCH_LIMIT", "25"),
        ("REDPULSE_TEXT_FIELDS", "title"),
    ]
    .into_iter()
    .collect();

    let o = PipelineOptions::from_lookup(|k| env.get(k).map(|v| v.to_string()));
    assert_eq!(o.raw_bucket, "raw-b");
    assert_eq!(o.staging_bucket, "stage-b");
    assert_eq!(o.processed_bucket, "dest-b");
    assert_eq!(o.destination_key, "out/merged.csv");
    assert_eq!(o.partitions, vec!["Canada", "AskACanadian", "CanadaJobs"]);
    assert_eq!(o.fetch_limit, 25);
    assert_eq!(o.text_fields, vec!["title"]);
}

#[test]
fn bad_or_blank_values_keep_defaults() {
    let o = PipelineOptions::from_lookup(|k| match k {
        "REDPULSE_FETCH_LIMIT" => Some("ten".to_string()),
        "S3_BUCKET_NAME" => Some("   ".to_string()),
        _ => None,
    });
    let d = PipelineOptions::default();
    assert_eq!(o.fetch_limit, d.fetch_limit);
    assert_eq!(o.raw_bucket, d.raw_bucket);
}
