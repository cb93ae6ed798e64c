//! Wire types for the X v2 user lookup and user timeline endpoints.

use chrono::{DateTime, Utc};
use dscope_core::{InteractionType, Post, SubjectProfileMeta};
use serde::Deserialize;

/// Profile metadata plus the sampled posts for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSnapshot {
    pub meta: SubjectProfileMeta,
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLookupResponse {
    pub data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub description: String,
    pub created_at: Option<String>,
    pub verified: Option<bool>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublicMetrics {
    pub tweet_count: Option<u64>,
}

impl UserData {
    pub(crate) fn into_meta(self, requested_handle: &str) -> SubjectProfileMeta {
        let handle = if self.username.is_empty() {
            requested_handle.to_string()
        } else {
            self.username.to_lowercase()
        };
        SubjectProfileMeta {
            handle,
            bio: self.description,
            post_count: self.public_metrics.and_then(|m| m.tweet_count),
            account_created_at: self
                .created_at
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            verified: self.verified,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelinePage {
    #[serde(default)]
    pub data: Vec<TweetData>,
    pub meta: Option<TimelineMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelineMeta {
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    pub entities: Option<Entities>,
    #[serde(default)]
    pub referenced_tweets: Vec<ReferencedTweet>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Entities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
    #[serde(default)]
    pub urls: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HashtagEntity {
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
}

impl TweetData {
    /// `None` for a post without an id, which cannot be de-duplicated.
    pub(crate) fn into_post(self) -> Option<Post> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let interaction_type = interaction_type(&self.referenced_tweets);
        let entities = self.entities.unwrap_or_default();
        Some(Post {
            id,
            text: self.text,
            interaction_type,
            hashtags: entities
                .hashtags
                .into_iter()
                .map(|h| format!("#{}", h.tag))
                .collect(),
            has_links: !entities.urls.is_empty(),
            // Native retweets carry the reposted text, never the subject's own.
            is_retweet_without_own_text: interaction_type == InteractionType::Retweet,
        })
    }
}

/// Quoted wins over replied-to, which wins over retweeted.
fn interaction_type(references: &[ReferencedTweet]) -> InteractionType {
    let has = |kind: &str| references.iter().any(|r| r.kind == kind);
    if has("quoted") {
        InteractionType::Quote
    } else if has("replied_to") {
        InteractionType::Reply
    } else if has("retweeted") {
        InteractionType::Retweet
    } else {
        InteractionType::Original
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tweet(value: serde_json::Value) -> TweetData {
        serde_json::from_value(value).expect("tweet fixture")
    }

    #[test]
    fn quote_outranks_reply() {
        let post = tweet(json!({
            "id": "1",
            "text": "both",
            "referenced_tweets": [
                { "type": "replied_to", "id": "9" },
                { "type": "quoted", "id": "8" }
            ]
        }))
        .into_post()
        .expect("post with id");
        assert_eq!(post.interaction_type, InteractionType::Quote);
    }

    #[test]
    fn retweet_has_no_own_text() {
        let post = tweet(json!({
            "id": "2",
            "text": "RT @someone: hello",
            "referenced_tweets": [{ "type": "retweeted", "id": "7" }]
        }))
        .into_post()
        .expect("post with id");
        assert_eq!(post.interaction_type, InteractionType::Retweet);
        assert!(post.is_retweet_without_own_text);
    }

    #[test]
    fn entities_become_hashtags_and_link_flag() {
        let post = tweet(json!({
            "id": "3",
            "text": "read this #economy",
            "entities": {
                "hashtags": [{ "start": 10, "end": 18, "tag": "economy" }],
                "urls": [{ "url": "https://t.co/x" }]
            }
        }))
        .into_post()
        .expect("post with id");
        assert_eq!(post.interaction_type, InteractionType::Original);
        assert_eq!(post.hashtags, vec!["#economy"]);
        assert!(post.has_links);
        assert!(!post.is_retweet_without_own_text);
    }

    #[test]
    fn post_without_id_is_dropped() {
        assert!(tweet(json!({ "text": "no id" })).into_post().is_none());
        assert!(tweet(json!({ "id": null, "text": "null id" })).into_post().is_none());
        assert!(tweet(json!({ "id": "", "text": "empty id" })).into_post().is_none());
    }

    #[test]
    fn user_meta_parses_creation_date() {
        let user: UserData = serde_json::from_value(json!({
            "id": "42",
            "username": "SomeOne",
            "description": "bio",
            "created_at": "2019-05-01T10:00:00.000Z",
            "public_metrics": { "tweet_count": 1234 }
        }))
        .unwrap();
        let meta = user.into_meta("someone");
        assert_eq!(meta.handle, "someone");
        assert_eq!(meta.post_count, Some(1234));
        assert!(meta.account_created_at.is_some());
        assert_eq!(meta.verified, None);
    }
}
