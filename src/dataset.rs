//! Datasets and shard merging.

use crate::error::PipelineError;
use std::collections::BTreeSet;

/// Ordered, same-shape rows destined for one output artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset<R> {
    pub columns: Vec<String>,
    pub rows: Vec<R>,
}

impl<R> Dataset<R> {
    pub fn new(columns: Vec<String>, rows: Vec<R>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// Result of merging shards. `Empty` means no shards were supplied, which is
/// reported distinctly from a fault.
#[derive(Clone, Debug, PartialEq)]
pub enum Merged<R> {
    Empty,
    Rows(Dataset<R>),
}

impl<R> Merged<R> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Merged::Empty)
    }

    pub fn into_dataset(self) -> Option<Dataset<R>> {
        match self {
            Merged::Empty => None,
            Merged::Rows(d) => Some(d),
        }
    }
}

/// Concatenate shards in input order, rows in their shard order. Every shard must
/// carry the same column set as the first; the first shard's column order wins.
pub fn merge<R>(shards: Vec<Dataset<R>>) -> Result<Merged<R>, PipelineError> {
    let mut iter = shards.into_iter();
    let Some(mut acc) = iter.next() else {
        return Ok(Merged::Empty);
    };
    for shard in iter {
        if shard.column_set() != acc.column_set() {
            return Err(PipelineError::SchemaMismatch {
                expected: acc.columns.clone(),
                found: shard.columns,
            });
        }
        acc.rows.extend(shard.rows);
    }
    Ok(Merged::Rows(acc))
}
