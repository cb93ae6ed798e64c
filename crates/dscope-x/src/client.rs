//! HTTP client for the X v2 REST API.
//!
//! Every request carries a bearer token from the shared [`TokenCache`]. A 401
//! or 403 on a refreshable token clears the cache, re-acquires and retries the
//! request once.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dscope_core::{AppConfig, Post};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::credentials::{AccessToken, CredentialChain};
use crate::error::XApiError;
use crate::token_cache::TokenCache;
use crate::types::{SubjectSnapshot, TimelinePage, UserLookupResponse};

const DEFAULT_BASE_URL: &str = "https://api.x.com/2";
const USER_FIELDS: &str = "description,public_metrics,created_at,verified";
const TWEET_FIELDS: &str = "created_at,lang,entities,referenced_tweets";
const MAX_PAGE_SIZE: usize = 100;
/// The timeline endpoint rejects `max_results` below 5.
const MIN_PAGE_SIZE: usize = 5;
/// Stops a misbehaving cursor from paging forever.
const MAX_PAGES: usize = 20;

#[derive(Debug, Clone)]
pub struct XClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on sampled posts.
    pub sample_size: usize,
}

impl Default for XClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            user_agent: "dscope/0.1 (discourse-profile)".to_string(),
            sample_size: 300,
        }
    }
}

impl XClientConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.x_api_base_url.clone(),
            timeout_secs: config.http_timeout_secs,
            user_agent: config.user_agent.clone(),
            sample_size: config.x_sample_size,
        }
    }
}

/// Client for the X v2 API.
///
/// Use [`XClient::new`] with an [`XClientConfig`] whose `base_url` points at
/// a mock server in tests.
pub struct XClient {
    http: Client,
    base_url: Url,
    chain: CredentialChain,
    cache: Arc<TokenCache>,
    sample_size: usize,
}

impl XClient {
    /// # Errors
    ///
    /// Returns [`XApiError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`XApiError::InvalidBaseUrl`] if `config.base_url` does not parse.
    pub fn new(
        config: XClientConfig,
        chain: CredentialChain,
        cache: Arc<TokenCache>,
    ) -> Result<Self, XApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent)
            .build()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| XApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(XApiError::InvalidBaseUrl {
                url: config.base_url,
                reason: "URL cannot be a base".to_string(),
            });
        }

        Ok(Self {
            http,
            base_url,
            chain,
            cache,
            sample_size: config.sample_size.max(1),
        })
    }

    /// Look up `handle` and sample its recent posts.
    ///
    /// # Errors
    ///
    /// - [`XApiError::Api`] for upstream failures (404 `UserNotFound` when the
    ///   lookup returns no user).
    /// - [`XApiError::EmptyProfile`] when the bio is empty and no posts exist.
    /// - [`XApiError::Credentials`] when no bearer token can be obtained.
    /// - [`XApiError::Http`] on network failure or timeout.
    pub async fn fetch_profile(&self, handle: &str) -> Result<SubjectSnapshot, XApiError> {
        let handle = handle.trim().trim_start_matches('@').to_lowercase();

        let url = self.endpoint(
            &["users", "by", "username", handle.as_str()],
            &[("user.fields", USER_FIELDS)],
        )?;
        let body = self.get_json(&url).await?;
        let lookup: UserLookupResponse =
            serde_json::from_value(body).map_err(|e| XApiError::Deserialize {
                context: format!("user lookup for @{handle}"),
                source: e,
            })?;

        let user = lookup
            .data
            .filter(|u| !u.id.is_empty())
            .ok_or_else(|| XApiError::Api {
                status: 404,
                code: Some("UserNotFound".to_string()),
                message: format!("user @{handle} not found"),
            })?;

        let user_id = user.id.clone();
        let meta = user.into_meta(&handle);
        let posts = self.fetch_timeline(&user_id).await?;

        if meta.bio.trim().is_empty() && posts.is_empty() {
            return Err(XApiError::EmptyProfile { handle });
        }

        tracing::info!(handle = %meta.handle, posts = posts.len(), "fetched subject profile");
        Ok(SubjectSnapshot { meta, posts })
    }

    /// Page through a user's timeline until the sample cap is reached or the
    /// cursor runs out, de-duplicating by post id.
    async fn fetch_timeline(&self, user_id: &str) -> Result<Vec<Post>, XApiError> {
        let mut posts: Vec<Post> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let remaining = self.sample_size - posts.len();
            let page_size = remaining.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE).to_string();

            let url = {
                let mut query = vec![
                    ("max_results", page_size.as_str()),
                    ("tweet.fields", TWEET_FIELDS),
                ];
                if let Some(token) = cursor.as_deref() {
                    query.push(("pagination_token", token));
                }
                self.endpoint(&["users", user_id, "tweets"], &query)?
            };

            let body = self.get_json(&url).await?;
            let page: TimelinePage =
                serde_json::from_value(body).map_err(|e| XApiError::Deserialize {
                    context: format!("timeline page {page_number} for user {user_id}"),
                    source: e,
                })?;

            let mut added = 0_usize;
            let mut skipped = 0_usize;
            for tweet in page.data {
                if posts.len() >= self.sample_size {
                    break;
                }
                let Some(post) = tweet.into_post() else {
                    skipped += 1;
                    continue;
                };
                if seen.insert(post.id.clone()) {
                    posts.push(post);
                    added += 1;
                }
            }
            tracing::debug!(
                page = page_number,
                added,
                skipped,
                total = posts.len(),
                "fetched timeline page"
            );

            if posts.len() >= self.sample_size {
                break;
            }
            match page.meta.and_then(|m| m.next_token) {
                Some(next) if added > 0 => cursor = Some(next),
                Some(_) => {
                    tracing::warn!(user_id, "timeline cursor returned no new posts; stopping");
                    break;
                }
                None => break,
            }
        }

        Ok(posts)
    }

    /// Build `{base}/{segments...}?{query}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, XApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| XApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET with the cached bearer token, refreshing it once on 401/403.
    async fn get_json(&self, url: &Url) -> Result<Value, XApiError> {
        let token = self.cache.get_or_acquire(&self.chain, &self.http).await?;
        let response = self.send(url, &token).await?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            && self.cache.invalidate(&token).await
        {
            tracing::warn!(
                status = status.as_u16(),
                source = %token.source,
                "bearer token rejected; re-acquiring and retrying once"
            );
            let token = self.cache.get_or_acquire(&self.chain, &self.http).await?;
            let response = self.send(url, &token).await?;
            return read_payload(response, url).await;
        }

        read_payload(response, url).await
    }

    async fn send(&self, url: &Url, token: &AccessToken) -> Result<reqwest::Response, XApiError> {
        Ok(self
            .http
            .get(url.clone())
            .bearer_auth(&token.value)
            .send()
            .await?)
    }
}

/// Map a response to its JSON body or a typed error.
///
/// A success status with a non-empty `errors` list is treated as 404.
async fn read_payload(response: reqwest::Response, url: &Url) -> Result<Value, XApiError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        return Err(XApiError::from_body(status.as_u16(), &body));
    }

    let body: Value = serde_json::from_str(&text).map_err(|e| XApiError::Deserialize {
        context: url.path().to_string(),
        source: e,
    })?;

    let has_errors = body
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty());
    if has_errors {
        return Err(XApiError::from_body(404, &body));
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use dscope_core::SystemClock;

    use super::*;

    fn test_client(base_url: &str) -> XClient {
        XClient::new(
            XClientConfig {
                base_url: base_url.to_string(),
                ..XClientConfig::default()
            },
            CredentialChain::default(),
            Arc::new(TokenCache::new(Arc::new(SystemClock))),
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_appends_to_versioned_base() {
        let client = test_client("https://api.x.com/2");
        let url = client
            .endpoint(&["users", "by", "username", "someone"], &[("user.fields", "description")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.x.com/2/users/by/username/someone?user.fields=description"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash_and_root_base() {
        let client = test_client("https://api.x.com/2/");
        let url = client.endpoint(&["users", "1", "tweets"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.x.com/2/users/1/tweets");

        let client = test_client("http://127.0.0.1:9000");
        let url = client.endpoint(&["users", "1", "tweets"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/users/1/tweets");
    }

    #[test]
    fn endpoint_encodes_path_segments() {
        let client = test_client("https://api.x.com/2");
        let url = client.endpoint(&["users", "by", "username", "a/b c"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.x.com/2/users/by/username/a%2Fb%20c");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = XClient::new(
            XClientConfig {
                base_url: "not a url".to_string(),
                ..XClientConfig::default()
            },
            CredentialChain::default(),
            Arc::new(TokenCache::new(Arc::new(SystemClock))),
        );
        assert!(matches!(result, Err(XApiError::InvalidBaseUrl { .. })));
    }
}
