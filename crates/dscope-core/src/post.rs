//! Platform-neutral post and account metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a post relates to other content on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Original,
    Reply,
    Quote,
    Retweet,
}

impl InteractionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Reply => "reply",
            Self::Quote => "quote",
            Self::Retweet => "retweet",
        }
    }
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single fetched post. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub interaction_type: InteractionType,
    /// Hashtags including the leading `#`, as reported by the platform.
    pub hashtags: Vec<String>,
    pub has_links: bool,
    pub is_retweet_without_own_text: bool,
}

impl Post {
    /// Convenience constructor for an original post with no entities.
    #[must_use]
    pub fn original(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            interaction_type: InteractionType::Original,
            hashtags: Vec::new(),
            has_links: false,
            is_retweet_without_own_text: false,
        }
    }
}

/// Account-level metadata sourced from the platform profile lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfileMeta {
    pub handle: String,
    pub bio: String,
    pub post_count: Option<u64>,
    pub account_created_at: Option<DateTime<Utc>>,
    pub verified: Option<bool>,
}
