//! Persistent store for analyzed subjects.
//!
//! A record is only ever mutated by [`RecordStore::save`], which archives the
//! current profile into `history` before replacing it. Profiles are stored as
//! raw JSON so that records written under an older schema still load; callers
//! re-validate them on read.

mod error;
mod file;
mod record;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use record::{HistoryEntry, StoreStats, SubjectRecord};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing document cannot be read.
    async fn get(&self, handle: &str) -> Result<Option<SubjectRecord>, StoreError>;

    /// Store `profile` as the subject's current profile, analyzed at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing document cannot be read or written.
    async fn save(
        &self,
        handle: &str,
        profile: Value,
        at: DateTime<Utc>,
    ) -> Result<SubjectRecord, StoreError>;

    /// Remove the whole record. Returns `false` when no record existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing document cannot be read or written.
    async fn delete(&self, handle: &str) -> Result<bool, StoreError>;

    /// Most recently analyzed records first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing document cannot be read.
    async fn recent(&self, limit: usize) -> Result<Vec<SubjectRecord>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing document cannot be read.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}

/// Store key for a handle: trimmed, without a leading `@`, lower-cased.
#[must_use]
pub fn record_key(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}
