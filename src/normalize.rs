//! Schema normalizer: project a raw record through a `FieldMapping` and cast each
//! retained field to its target type.

use crate::error::FieldError;
use crate::record::{FieldValue, NormalizedRecord, RawRecord};
use crate::schema::{FieldMapping, FieldSpec, TargetType};
use serde_json::Value;

/// Normalize one record. Absent and null fields take the zero value of their type;
/// an uncastable value fails the record only when its `FieldSpec` is `required`.
pub fn normalize(raw: &RawRecord, mapping: &FieldMapping) -> Result<NormalizedRecord, FieldError> {
    let mut out = NormalizedRecord::with_capacity(mapping.len());
    for spec in mapping.specs() {
        let value = match raw.get(&spec.source) {
            None | Some(Value::Null) => zero_value(spec.target_type),
            Some(v) => cast_field(v, spec)?,
        };
        out.push(spec.target.clone(), value);
    }
    Ok(out)
}

/// Normalize a batch; failed rows are returned by index instead of aborting the batch.
pub fn normalize_all(
    raws: &[RawRecord],
    mapping: &FieldMapping,
) -> (Vec<NormalizedRecord>, Vec<(usize, FieldError)>) {
    let mut ok = Vec::with_capacity(raws.len());
    let mut failed = Vec::new();
    for (row, raw) in raws.iter().enumerate() {
        match normalize(raw, mapping) {
            Ok(rec) => ok.push(rec),
            Err(e) => failed.push((row, e)),
        }
    }
    (ok, failed)
}

/// Remove `fields` from a raw record in place.
pub fn drop_fields(raw: &mut RawRecord, fields: &[String]) {
    for f in fields {
        raw.remove(f);
    }
}

pub fn zero_value(t: TargetType) -> FieldValue {
    match t {
        TargetType::String => FieldValue::Str(String::new()),
        TargetType::Int => FieldValue::Int(0),
        TargetType::Decimal => FieldValue::Decimal(0.0),
        TargetType::Bool => FieldValue::Bool(false),
    }
}

fn cast_field(v: &Value, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    match cast_value(v, spec.target_type) {
        Some(out) => Ok(out),
        None if spec.required => Err(FieldError::CastFailure {
            field: spec.source.clone(),
            target_type: spec.target_type,
            value: display_raw(v),
        }),
        None => {
            tracing::debug!(field = %spec.source, value = %display_raw(v), "uncastable optional field, using zero value");
            Ok(zero_value(spec.target_type))
        }
    }
}

/// Cast a JSON scalar to `t`. Returns `None` when the value has no sensible
/// representation in the target type.
pub fn cast_value(v: &Value, t: TargetType) -> Option<FieldValue> {
    match t {
        TargetType::String => Some(FieldValue::Str(display_raw(v))),
        TargetType::Int => match v {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(whole_f64_to_i64))
                .map(FieldValue::Int),
            Value::String(s) => parse_int(s).map(FieldValue::Int),
            Value::Bool(b) => Some(FieldValue::Int(*b as i64)),
            _ => None,
        },
        TargetType::Decimal => match v {
            Value::Number(n) => n.as_f64().map(FieldValue::Decimal),
            Value::String(s) => parse_decimal(s).map(FieldValue::Decimal),
            _ => None,
        },
        TargetType::Bool => match v {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_i64().and_then(|i| match i {
                0 => Some(FieldValue::Bool(false)),
                1 => Some(FieldValue::Bool(true)),
                _ => None,
            }),
            Value::String(s) => parse_bool(s).map(FieldValue::Bool),
            _ => None,
        },
    }
}

fn whole_f64_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Integer parse that also accepts whole-valued decimals ("12.0").
/// An empty string is the zero value.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(whole_f64_to_i64))
}

pub fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Common truthy/falsy spellings, case-insensitive. Empty is false.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "off" | "" => Some(false),
        _ => None,
    }
}

fn display_raw(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
