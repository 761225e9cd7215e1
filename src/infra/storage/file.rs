//! File-backed storage using an append-only JSON-lines log.
//!
//! Each mutation appends one `{"key": .., "value": ..}` record; a `null`
//! value is a deletion. The log is replayed into memory on open.

use std::collections::HashMap;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::Storage;
use crate::core::{WorkloadError, WorkloadResult};

#[derive(Serialize, Deserialize)]
struct LogRecord {
    key: String,
    value: Option<Vec<u8>>,
}

struct Inner {
    entries: HashMap<String, Vec<u8>>,
    log: File,
}

/// Durable storage persisting every mutation to `<dir>/<namespace>.jsonl`.
pub struct FileStorage {
    path: PathBuf,
    inner: Mutex<Inner>,
}

fn backend(e: impl std::fmt::Display) -> WorkloadError {
    WorkloadError::Backend(e.to_string())
}

impl FileStorage {
    /// Open (or create) the log for `namespace` inside `dir` and replay it.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> WorkloadResult<Self> {
        let dir = dir.as_ref();
        create_dir_all(dir).map_err(backend)?;
        let path = dir.join(format!("{namespace}.jsonl"));
        let entries = Self::replay(&path)?;
        tracing::debug!("replayed {} keys from {}", entries.len(), path.display());
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(backend)?;
        Ok(Self {
            path,
            inner: Mutex::new(Inner { entries, log }),
        })
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> WorkloadResult<HashMap<String, Vec<u8>>> {
        let mut entries = HashMap::new();
        if !path.exists() {
            return Ok(entries);
        }
        let file = File::open(path).map_err(backend)?;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(backend)?;
            if line.trim().is_empty() {
                continue;
            }
            let record: LogRecord = serde_json::from_str(&line)?;
            match record.value {
                Some(value) if !value.is_empty() => {
                    entries.insert(record.key, value);
                }
                _ => {
                    entries.remove(&record.key);
                }
            }
        }
        Ok(entries)
    }

    fn append(inner: &mut Inner, key: &str, value: Option<&[u8]>) -> WorkloadResult<()> {
        let record = LogRecord {
            key: key.to_string(),
            value: value.map(<[u8]>::to_vec),
        };
        let line = serde_json::to_string(&record)?;
        writeln!(inner.log, "{line}").map_err(backend)?;
        inner.log.flush().map_err(backend)
    }

    fn put(inner: &mut Inner, key: &str, value: Vec<u8>) -> WorkloadResult<()> {
        if value.is_empty() {
            Self::append(inner, key, None)?;
            inner.entries.remove(key);
        } else {
            Self::append(inner, key, Some(&value))?;
            inner.entries.insert(key.to_string(), value);
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn create(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool> {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(key) {
            return Ok(false);
        }
        Self::put(&mut inner, key, value)?;
        Ok(true)
    }

    async fn read(&self, key: &str) -> WorkloadResult<Option<Vec<u8>>> {
        Ok(self.inner.lock().entries.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Vec<u8>) -> WorkloadResult<bool> {
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(key) {
            return Ok(false);
        }
        Self::put(&mut inner, key, value)?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> WorkloadResult<bool> {
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(key) {
            return Ok(false);
        }
        Self::append(&mut inner, key, None)?;
        inner.entries.remove(key);
        Ok(true)
    }
}
