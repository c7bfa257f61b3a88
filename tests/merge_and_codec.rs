#[path = "common/mod.rs"]
mod common;

use common::{submission, zst_lines};
use redpulse::{
    decode_csv, decode_enriched, decode_json_records, decode_object, encode_enriched, encode_json_records,
    encode_normalized, merge, normalize, Dataset, EnrichedRecord, FieldMapping, FieldValue, Merged, ObjectFormat,
    PipelineError, Sentiment, ENRICHMENT_COLUMNS,
};
use serde_json::{json, Value};

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn merging_nothing_is_an_explicit_empty_result() {
    let merged = merge::<u32>(Vec::new()).unwrap();
    assert!(merged.is_empty());
    assert_eq!(merged, Merged::Empty);
    assert!(merged.into_dataset().is_none());
}

#[test]
fn merge_concatenates_in_shard_then_row_order() {
    let d1 = Dataset::new(cols(&["a", "b"]), vec![1, 2, 3]);
    let d2 = Dataset::new(cols(&["a", "b"]), vec![10, 20]);
    let d3 = Dataset::new(cols(&["a", "b"]), Vec::new());

    let out = merge(vec![d1, d2, d3]).unwrap().into_dataset().unwrap();
    assert_eq!(out.len(), 5);
    assert_eq!(out.rows, vec![1, 2, 3, 10, 20]);
    assert_eq!(out.columns, cols(&["a", "b"]));
}

#[test]
fn merge_compares_column_sets_not_order() {
    let d1 = Dataset::new(cols(&["a", "b"]), vec!['x']);
    let d2 = Dataset::new(cols(&["b", "a"]), vec!['y']);
    let out = merge(vec![d1, d2]).unwrap().into_dataset().unwrap();
    assert_eq!(out.columns, cols(&["a", "b"]), "first shard's order wins");
    assert_eq!(out.rows, vec!['x', 'y']);
}

#[test]
fn merge_rejects_mismatched_schemas() {
    let d1 = Dataset::new(cols(&["a", "b"]), vec![1]);
    let d2 = Dataset::new(cols(&["a", "c"]), vec![2]);
    let err = merge(vec![d1, d2]).unwrap_err();
    match err {
        PipelineError::SchemaMismatch { expected, found } => {
            assert_eq!(expected, cols(&["a", "b"]));
            assert_eq!(found, cols(&["a", "c"]));
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

/// Enriched rows survive CSV encode/decode, including an empty optional field and
/// text that needs quoting.
#[test]
fn enriched_csv_round_trip() {
    let mapping = FieldMapping::reddit_default();
    let mut quoted = submission("Canada", "He said \"hi\", then left", "line one\nline two", 5);
    quoted.insert("upvote_ratio".into(), json!(0.875));
    let plain = submission("Canada", "Plain", "", 0);

    let records = vec![
        EnrichedRecord {
            record: normalize(&quoted, &mapping).unwrap(),
            sentiment: Sentiment::Positive,
            sentiment_score: 0.7,
            sentiment_magnitude: 1.4,
            key_phrases: "line, line".into(),
        },
        EnrichedRecord {
            record: normalize(&plain, &mapping).unwrap(),
            sentiment: Sentiment::Error,
            sentiment_score: 0.0,
            sentiment_magnitude: 0.0,
            key_phrases: String::new(),
        },
    ];
    // link_flair_text is null in the fixture: an empty optional field.
    assert_eq!(records[1].record.get("link_flair_text"), Some(&FieldValue::Str(String::new())));

    let columns = mapping.target_names();
    let bytes = encode_enriched(&columns, &records).unwrap();

    let table = decode_csv(&bytes).unwrap();
    let mut expected_headers = columns.clone();
    expected_headers.extend(ENRICHMENT_COLUMNS.iter().map(|s| s.to_string()));
    assert_eq!(table.headers, expected_headers);

    let back = decode_enriched(&bytes, &mapping.staged()).unwrap();
    assert_eq!(back, records);
}

#[test]
fn decode_enriched_requires_enrichment_columns() {
    let err = decode_enriched(b"title,selftext\nx,y\n", &FieldMapping::passthrough(["title", "selftext"]).unwrap())
        .unwrap_err();
    assert!(matches!(err, PipelineError::MissingRequiredColumn(ref c) if c.len() == ENRICHMENT_COLUMNS.len()));
}

#[test]
fn normalized_csv_uses_column_names() {
    let mapping = FieldMapping::reddit_default();
    let rec = normalize(&submission("Canada", "T", "S", 9), &mapping).unwrap();
    let bytes = encode_normalized(&["title".to_string(), "score".to_string(), "nope".to_string()], &[rec]).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "title,score,nope\nT,9,\n");
}

#[test]
fn empty_cells_decode_as_null() {
    let table = decode_csv(b"title,selftext\nGood news,\n").unwrap();
    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].get("title"), Some(&json!("Good news")));
    assert_eq!(table.records[0].get("selftext"), Some(&Value::Null));
}

#[test]
fn json_payloads_as_array_or_ndjson() {
    let recs = vec![submission("a", "x", "", 1), submission("b", "y", "", 2)];
    let array = encode_json_records(&recs).unwrap();
    assert_eq!(decode_json_records(&array).unwrap(), recs);

    let ndjson = format!(
        "{}\n\n{}\n",
        serde_json::to_string(&recs[0]).unwrap(),
        serde_json::to_string(&recs[1]).unwrap()
    );
    assert_eq!(decode_json_records(ndjson.as_bytes()).unwrap(), recs);
    assert!(decode_json_records(b"  \n").unwrap().is_empty());
}

#[test]
fn objects_decode_by_key_suffix() {
    assert_eq!(ObjectFormat::from_key("a/b.json"), ObjectFormat::Json);
    assert_eq!(ObjectFormat::from_key("a/b.NDJSON.zst"), ObjectFormat::Json);
    assert_eq!(ObjectFormat::from_key("a/b.csv"), ObjectFormat::Csv);
    assert_eq!(ObjectFormat::from_key("a/b.txt"), ObjectFormat::Csv);

    let lines = vec![
        json!({"title": "first", "score": 1}).to_string(),
        json!({"title": "second", "score": 2}).to_string(),
    ];
    let recs = decode_object("dump/RS_2024-01.ndjson.zst", &zst_lines(&lines)).unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].get("title"), Some(&json!("second")));

    assert_eq!(ObjectFormat::from_key("a/b.NDJSON.ZST"), ObjectFormat::Json);
    let upper = decode_object("dump/RS_2024-02.NDJSON.ZST", &zst_lines(&lines)).unwrap();
    assert_eq!(upper.len(), 2);
    assert_eq!(upper[0].get("title"), Some(&json!("first")));

    let csv_recs = decode_object("x.csv", b"title,score\nhello,3\n").unwrap();
    assert_eq!(csv_recs[0].get("score"), Some(&json!("3")));
}
