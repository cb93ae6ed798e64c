//! Whole-document JSON file store.
//!
//! All records live in one JSON object keyed by lower-cased handle. Every
//! write reads the document, mutates it and writes it back through a sibling
//! temp file that is renamed over the original, so a reader never observes a
//! half-written document.
//!
//! Entries that no longer deserialize are skipped on read and written back
//! unchanged, so one bad record never blocks the rest. Saving a subject whose
//! entry was unreadable replaces that entry.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::record::{StoreStats, SubjectRecord};
use crate::{record_key, RecordStore};

#[derive(Debug, Default)]
struct Document {
    records: BTreeMap<String, SubjectRecord>,
    unreadable: Map<String, Value>,
}

impl Document {
    fn from_entries(entries: Map<String, Value>) -> Self {
        let mut document = Self::default();
        for (key, value) in entries {
            match serde_json::from_value::<SubjectRecord>(value.clone()) {
                Ok(record) => {
                    document.records.insert(key, record);
                }
                Err(e) => {
                    tracing::warn!(handle = %key, error = %e, "skipping unreadable subject record");
                    document.unreadable.insert(key, value);
                }
            }
        }
        document
    }

    fn into_entries(self) -> Result<Map<String, Value>, StoreError> {
        let mut entries = self.unreadable;
        for (key, record) in self.records {
            let value = serde_json::to_value(record).map_err(StoreError::Serialize)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }
}

pub struct JsonFileStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        let entries: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(Document::from_entries(entries))
    }

    async fn persist(&self, document: Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let entries = document.into_entries()?;
        let bytes = serde_json::to_vec_pretty(&entries).map_err(StoreError::Serialize)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn get(&self, handle: &str) -> Result<Option<SubjectRecord>, StoreError> {
        let mut document = self.load().await?;
        Ok(document.records.remove(&record_key(handle)))
    }

    async fn save(
        &self,
        handle: &str,
        profile: Value,
        at: DateTime<Utc>,
    ) -> Result<SubjectRecord, StoreError> {
        let _guard = self.write_lock.lock().await;
        let key = record_key(handle);
        let mut document = self.load().await?;

        document.unreadable.remove(&key);
        let record = match document.records.remove(&key) {
            Some(mut existing) => {
                existing.supersede(profile, at);
                existing
            }
            None => SubjectRecord::new(key.clone(), profile, at),
        };
        document.records.insert(key.clone(), record.clone());
        self.persist(document).await?;

        tracing::info!(
            handle = %key,
            history = record.history.len(),
            path = %self.path.display(),
            "saved subject record"
        );
        Ok(record)
    }

    async fn delete(&self, handle: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let key = record_key(handle);
        let mut document = self.load().await?;
        let removed = document.records.remove(&key).is_some()
            || document.unreadable.remove(&key).is_some();
        if !removed {
            return Ok(false);
        }
        self.persist(document).await?;
        tracing::info!(handle = %key, "deleted subject record");
        Ok(true)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SubjectRecord>, StoreError> {
        let mut records: Vec<SubjectRecord> = self.load().await?.records.into_values().collect();
        records.sort_by(|a, b| b.last_analyzed_at.cmp(&a.last_analyzed_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let records = self.load().await?.records;
        Ok(StoreStats {
            subjects: records.len(),
            archived_profiles: records.values().map(|r| r.history.len()).sum(),
            last_analyzed_at: records.values().map(|r| r.last_analyzed_at).max(),
        })
    }
}
