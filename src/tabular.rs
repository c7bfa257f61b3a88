//! Tabular and JSON codecs for object payloads.
//!
//! CSV: header row, comma separator, double-quote quoting, UTF-8. Empty cells decode to
//! `null` so the normalizer treats them like absent fields.

use crate::error::{PipelineError, Result};
use crate::normalize::normalize;
use crate::record::{EnrichedRecord, NormalizedRecord, RawRecord, ENRICHMENT_COLUMNS};
use crate::schema::FieldMapping;
use crate::sentiment::Sentiment;
use serde_json::Value;
use std::io::BufRead;

/// Decoded CSV payload: header names plus one raw record per data row.
#[derive(Clone, Debug, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

pub fn decode_csv(bytes: &[u8]) -> Result<CsvTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .quote(b'"')
        .from_reader(bytes);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut rec = RawRecord::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            let v = if cell.is_empty() { Value::Null } else { Value::String(cell.to_string()) };
            rec.insert(name.clone(), v);
        }
        records.push(rec);
    }
    Ok(CsvTable { headers, records })
}

fn write_rows<I>(headers: &[String], rows: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut w = csv::WriterBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .from_writer(Vec::new());
    w.write_record(headers)?;
    for row in rows {
        w.write_record(&row)?;
    }
    w.into_inner().map_err(|e| PipelineError::Io(e.into_error()))
}

pub fn encode_normalized(columns: &[String], records: &[NormalizedRecord]) -> Result<Vec<u8>> {
    write_rows(columns, records.iter().map(|r| r.row(columns)))
}

/// Header is `columns` followed by the enrichment columns.
pub fn encode_enriched(columns: &[String], records: &[EnrichedRecord]) -> Result<Vec<u8>> {
    let mut headers = columns.to_vec();
    headers.extend(ENRICHMENT_COLUMNS.iter().map(|c| c.to_string()));
    write_rows(&headers, records.iter().map(|r| r.to_row(columns)))
}

/// Inverse of `encode_enriched`; schema columns are re-cast through `mapping`.
pub fn decode_enriched(bytes: &[u8], mapping: &FieldMapping) -> Result<Vec<EnrichedRecord>> {
    let table = decode_csv(bytes)?;
    let missing: Vec<String> = ENRICHMENT_COLUMNS
        .iter()
        .filter(|c| !table.headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingRequiredColumn(missing));
    }

    let mut out = Vec::with_capacity(table.records.len());
    for raw in &table.records {
        let record = normalize(raw, mapping)?;
        let cell = |name: &str| raw.get(name).and_then(Value::as_str).unwrap_or("").to_string();

        let sentiment_cell = cell("sentiment");
        let sentiment = sentiment_cell.parse::<Sentiment>().map_err(|_| {
            PipelineError::InvalidColumnValue { column: "sentiment".into(), value: sentiment_cell.clone() }
        })?;
        out.push(EnrichedRecord {
            record,
            sentiment,
            sentiment_score: parse_f64_cell("sentiment_score", &cell("sentiment_score"))?,
            sentiment_magnitude: parse_f64_cell("sentiment_magnitude", &cell("sentiment_magnitude"))?,
            key_phrases: cell("key_phrases"),
        });
    }
    Ok(out)
}

fn parse_f64_cell(column: &str, s: &str) -> Result<f64> {
    if s.trim().is_empty() {
        return Ok(0.0);
    }
    s.trim().parse::<f64>().map_err(|_| PipelineError::InvalidColumnValue {
        column: column.to_string(),
        value: s.to_string(),
    })
}

/// JSON array of objects, or NDJSON (one object per line).
pub fn decode_json_records(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let first = bytes.iter().find(|b| !b.is_ascii_whitespace()).copied();
    match first {
        None => Ok(Vec::new()),
        Some(b'[') => Ok(serde_json::from_slice::<Vec<RawRecord>>(bytes)?),
        Some(_) => {
            let mut out = Vec::new();
            for line in bytes.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                out.push(serde_json::from_str::<RawRecord>(&line)?);
            }
            Ok(out)
        }
    }
}

pub fn encode_json_records(records: &[RawRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

/// Payload format, chosen by key suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectFormat {
    Json,
    Csv,
}

/// Split a trailing `.zst` off `key`, in any case. Returns whether it was present.
pub(crate) fn strip_zst(key: &str) -> (bool, &str) {
    let n = key.len();
    if n >= 4 && key.as_bytes()[n - 4..].eq_ignore_ascii_case(b".zst") {
        (true, &key[..n - 4])
    } else {
        (false, key)
    }
}

impl ObjectFormat {
    /// `.json`, `.ndjson` and `.jsonl` are JSON; anything else is CSV.
    /// A trailing `.zst` is ignored here and handled by `decode_object`.
    pub fn from_key(key: &str) -> Self {
        let k = strip_zst(key).1.to_ascii_lowercase();
        if k.ends_with(".json") || k.ends_with(".ndjson") || k.ends_with(".jsonl") {
            ObjectFormat::Json
        } else {
            ObjectFormat::Csv
        }
    }
}

/// Decode any stored object into raw records; `.zst` payloads are decompressed first.
pub fn decode_object(key: &str, bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let owned;
    let payload = if strip_zst(key).0 {
        owned = zstd::stream::decode_all(bytes)?;
        owned.as_slice()
    } else {
        bytes
    };
    match ObjectFormat::from_key(key) {
        ObjectFormat::Json => decode_json_records(payload),
        ObjectFormat::Csv => Ok(decode_csv(payload)?.records),
    }
}
