#![allow(dead_code)]

use redpulse::{
    NdjsonWriter, PartOfSpeech, Polarity, RawRecord, ScorerFault, SentimentScorer, SyntaxAnalyzer, Token,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Borrow a `json!({...})` literal as a raw record.
pub fn raw(v: Value) -> RawRecord {
    v.as_object().cloned().expect("fixture must be a JSON object")
}

/// A submission as the listing API returns it, with the fields the jobs care about
/// plus a few that the transform drops.
pub fn submission(subreddit: &str, title: &str, selftext: &str, score: i64) -> RawRecord {
    raw(json!({
        "subreddit": subreddit,
        "title": title,
        "selftext": selftext,
        "score": score,
        "num_comments": 3,
        "created_utc": 1700000000.0,
        "author": "maple_leaf",
        "url": "https://example.com/post",
        "permalink": "/r/x/comments/abc/post/",
        "upvote_ratio": 0.95,
        "thumbnail": "self",
        "domain": "self.x",
        "link_flair_text": null,
        "is_video": false,
        "total_awards_received": 0,
        "is_original_content": false,
        "link_flair_type": "text",
        "is_self": true,
        "ups": score,
        "downs": 0,
        "id": "abc",
        "over_18": false
    }))
}

/// Write `records` as `<dir>/<name>.ndjson`, one object per line.
pub fn write_ndjson_partition(dir: &Path, name: &str, records: &[RawRecord]) {
    fs::create_dir_all(dir).unwrap();
    let mut w = NdjsonWriter::create(&dir.join(format!("{name}.ndjson")), 8 * 1024).unwrap();
    for r in records {
        w.write_line(&serde_json::to_string(r).unwrap()).unwrap();
    }
    w.finish().unwrap();
}

/// zstd-compress the provided lines (newline-terminated).
pub fn zst_lines(lines: &[String]) -> Vec<u8> {
    let mut enc = zstd::stream::write::Encoder::new(Vec::new(), 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap()
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    f.write_all(bytes).unwrap();
}

/// Parse CSV bytes into header + rows keyed by column name.
pub fn csv_rows(bytes: &[u8]) -> (Vec<String>, Vec<HashMap<String, String>>) {
    let mut rdr = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(|s| s.to_string()).collect();
    let rows = rdr
        .records()
        .map(|r| {
            let r = r.unwrap();
            headers.iter().cloned().zip(r.iter().map(|s| s.to_string())).collect()
        })
        .collect();
    (headers, rows)
}

// -------- deterministic analysis backends --------

/// Always returns the same polarity.
pub struct FixedScorer(pub f64, pub f64);

impl SentimentScorer for FixedScorer {
    fn score(&self, _text: &str) -> Result<Polarity, ScorerFault> {
        Ok(Polarity { score: self.0, magnitude: self.1 })
    }
}

/// Fails every call, like an unreachable backend.
pub struct FailingScorer;

impl SentimentScorer for FailingScorer {
    fn score(&self, _text: &str) -> Result<Polarity, ScorerFault> {
        Err(ScorerFault::Unavailable("connection refused".into()))
    }
}

/// Fails only for texts containing `needle`.
pub struct FailOn(pub &'static str);

impl SentimentScorer for FailOn {
    fn score(&self, text: &str) -> Result<Polarity, ScorerFault> {
        if text.contains(self.0) {
            Err(ScorerFault::Backend(format!("cannot score {:?}", self.0)))
        } else {
            Ok(Polarity { score: 0.5, magnitude: 0.5 })
        }
    }
}

/// Counts calls and reports neutral.
#[derive(Default)]
pub struct CountingScorer {
    pub calls: AtomicUsize,
}

impl CountingScorer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SentimentScorer for CountingScorer {
    fn score(&self, _text: &str) -> Result<Polarity, ScorerFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Polarity::default())
    }
}

/// Tags every capitalized word as a noun and everything else as `Other`.
pub struct CapitalNouns;

impl SyntaxAnalyzer for CapitalNouns {
    fn analyze_syntax(&self, text: &str) -> Result<Vec<Token>, ScorerFault> {
        Ok(text
            .split_whitespace()
            .map(|w| Token {
                text: w.to_string(),
                tag: if w.chars().next().is_some_and(char::is_uppercase) {
                    PartOfSpeech::Noun
                } else {
                    PartOfSpeech::Other
                },
            })
            .collect())
    }
}

pub struct FailingSyntax;

impl SyntaxAnalyzer for FailingSyntax {
    fn analyze_syntax(&self, _text: &str) -> Result<Vec<Token>, ScorerFault> {
        Err(ScorerFault::Backend("syntax quota exceeded".into()))
    }
}
