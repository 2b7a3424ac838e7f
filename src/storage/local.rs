//! File-backed string key/value store.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::observability::metrics;
use crate::storage::StorageResult;

/// A thread-safe key/value store, optionally mirrored to a JSON file.
///
/// Every `set` and `remove` rewrites the file before returning.
#[derive(Clone, Default)]
pub struct LocalStorage {
    inner: Arc<DashMap<String, String>>,
    persistence_path: Option<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStorage {
    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let storage = Self {
            inner: Arc::new(DashMap::new()),
            persistence_path: Some(path.to_path_buf()),
            write_lock: Arc::new(Mutex::new(())),
        };
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: BTreeMap<String, String> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                storage.inner.insert(k, v);
            }
            tracing::debug!(path = %path.display(), entries = storage.inner.len(), "Loaded local storage");
        }
        Ok(storage)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> StorageResult<()> {
        self.inner.insert(key.to_string(), value.into());
        self.flush()
    }

    /// Remove `key`. Removing an absent key still succeeds.
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        if self.inner.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sorted snapshot of all entries.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    fn flush(&self) -> StorageResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(writer, &self.snapshot())?;
        }
        fs::rename(&tmp, path)?;
        metrics::record_storage_write();
        Ok(())
    }
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values hold credentials; only keys are shown.
        f.debug_struct("LocalStorage")
            .field("keys", &self.inner.iter().map(|r| r.key().clone()).collect::<Vec<_>>())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}
