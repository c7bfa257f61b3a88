//! Object-store seam: `list`, `get`, `put` over (bucket, key) pairs.
//!
//! - `MemoryStore`: thread-safe in-memory map, used by tests and dry runs.
//! - `FsStore`: a directory per bucket under a root; `put` is atomic via temp + rename.

use crate::error::StoreError;
use crate::util::{create_with_backoff, open_with_backoff, replace_file_atomic_backoff};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const CONTENT_TYPE_CSV: &str = "text/csv";
pub const CONTENT_TYPE_JSON: &str = "application/json";

const STAGING_SUFFIX: &str = ".inprogress";

pub trait ObjectStore: Send + Sync {
    /// Keys under `prefix` (empty prefix lists the whole bucket), sorted.
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError>;
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
    /// Whole-object write: either the full payload is visible afterwards or nothing changed.
    fn put(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects.lock().get(&(bucket.to_string(), key.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .objects
            .lock()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.object(bucket, key)
            .map(|o| o.bytes)
            .ok_or_else(|| StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
    }

    fn put(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.objects.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject { bytes: bytes.to_vec(), content_type: content_type.to_string() },
        );
        Ok(())
    }
}

/// Filesystem-backed store: `<root>/<bucket>/<key>`.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for FsStore {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        validate_key(bucket)?;
        let dir = self.root.join(bucket);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&dir) else { continue };
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.ends_with(STAGING_SUFFIX) || !key.starts_with(prefix) {
                continue;
            }
            keys.push(key);
        }
        keys.sort();
        Ok(keys)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        let mut f = match open_with_backoff(&path, 16, 50) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
            }
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn put(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = path.clone().into_os_string();
        tmp.push(STAGING_SUFFIX);
        let tmp = PathBuf::from(tmp);

        let mut f = create_with_backoff(&tmp, 16, 50)?;
        f.write_all(bytes)?;
        f.flush()?;
        drop(f);
        replace_file_atomic_backoff(&tmp, &path)
            .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::Other, format!("{e:#}"))))?;
        tracing::debug!(bucket, key, content_type, bytes = bytes.len(), "object written");
        Ok(())
    }
}

/// Relative, `/`-separated, no `..` or empty segments.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && !key.starts_with('/')
        && key.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != "..")
        && Path::new(key).components().all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
