use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A previously current profile, kept with the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "date")]
    pub analyzed_at: DateTime<Utc>,
    #[serde(alias = "data")]
    pub profile: Value,
}

/// Everything stored for one subject. Older documents that used
/// `username`/`current_data`/`date`/`data` still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    #[serde(alias = "username")]
    pub handle: String,
    pub last_analyzed_at: DateTime<Utc>,
    #[serde(alias = "current_data")]
    pub current_profile: Value,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl SubjectRecord {
    pub(crate) fn new(handle: String, profile: Value, at: DateTime<Utc>) -> Self {
        Self {
            handle,
            last_analyzed_at: at,
            current_profile: profile,
            history: Vec::new(),
        }
    }

    /// Archive the current profile under its own timestamp, then replace it.
    pub(crate) fn supersede(&mut self, profile: Value, at: DateTime<Utc>) {
        let previous = std::mem::replace(&mut self.current_profile, profile);
        self.history.push(HistoryEntry {
            analyzed_at: self.last_analyzed_at,
            profile: previous,
        });
        self.last_analyzed_at = at;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub subjects: usize,
    pub archived_profiles: usize,
    pub last_analyzed_at: Option<DateTime<Utc>>,
}
