//! Source partitions: named collections of posts, each fetched as a lazy, finite
//! sequence of raw records.

use crate::error::PartitionFault;
use crate::ndjson::NdjsonReader;
use crate::record::RawRecord;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<RawRecord, PartitionFault>> + Send + 'a>;

/// Source API client seam.
pub trait PostSource: Send + Sync {
    /// Newest-first items of partition `name`, at most `limit` of them.
    fn fetch_partition(&self, name: &str, limit: usize) -> Result<RecordIter<'_>, PartitionFault>;
}

fn io_fault(partition: &str, e: io::Error) -> PartitionFault {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            PartitionFault::Forbidden { partition: partition.to_string(), reason: e.to_string() }
        }
        io::ErrorKind::NotFound => {
            PartitionFault::NotFound { partition: partition.to_string(), reason: e.to_string() }
        }
        _ => PartitionFault::Backend { partition: partition.to_string(), reason: e.to_string() },
    }
}

/// Reads `<dir>/<name>.ndjson`, one post per line, lazily.
#[derive(Clone, Debug)]
pub struct NdjsonDirSource {
    dir: PathBuf,
    read_buffer_bytes: usize,
}

impl NdjsonDirSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), read_buffer_bytes: 64 * 1024 }
    }

    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes;
        self
    }

    pub fn partition_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.ndjson"))
    }
}

impl PostSource for NdjsonDirSource {
    fn fetch_partition(&self, name: &str, limit: usize) -> Result<RecordIter<'_>, PartitionFault> {
        let path = self.partition_path(name);
        let mut reader =
            NdjsonReader::open(&path, self.read_buffer_bytes).map_err(|e| io_fault(name, e))?;
        let partition = name.to_string();
        let mut failed = false;

        let iter = std::iter::from_fn(move || {
            if failed {
                return None;
            }
            match reader.next_record_line() {
                Ok(None) => None,
                Ok(Some(line)) => Some(serde_json::from_str::<RawRecord>(&line).map_err(|e| {
                    failed = true;
                    PartitionFault::Backend { partition: partition.clone(), reason: format!("bad record: {e}") }
                })),
                Err(e) => {
                    failed = true;
                    Some(Err(io_fault(&partition, e)))
                }
            }
        })
        .take(limit);
        Ok(Box::new(iter))
    }
}

/// Failure injected for a partition of a `StaticSource`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InjectedFault {
    Forbidden(String),
    Backend(String),
}

/// In-memory partitions, optionally with injected faults. Unknown names are `NotFound`.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    partitions: BTreeMap<String, Vec<RawRecord>>,
    faults: BTreeMap<String, InjectedFault>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition(mut self, name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        self.partitions.insert(name.into(), records);
        self
    }

    pub fn with_fault(mut self, name: impl Into<String>, fault: InjectedFault) -> Self {
        self.faults.insert(name.into(), fault);
        self
    }
}

impl PostSource for StaticSource {
    fn fetch_partition(&self, name: &str, limit: usize) -> Result<RecordIter<'_>, PartitionFault> {
        if let Some(fault) = self.faults.get(name) {
            let partition = name.to_string();
            return Err(match fault {
                InjectedFault::Forbidden(reason) => PartitionFault::Forbidden { partition, reason: reason.clone() },
                InjectedFault::Backend(reason) => PartitionFault::Backend { partition, reason: reason.clone() },
            });
        }
        let records = self.partitions.get(name).ok_or_else(|| PartitionFault::NotFound {
            partition: name.to_string(),
            reason: "no such partition".to_string(),
        })?;
        Ok(Box::new(records.iter().take(limit).cloned().map(Ok)))
    }
}
