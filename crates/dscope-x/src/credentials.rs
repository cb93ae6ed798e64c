//! Bearer credential strategies, tried in order until one succeeds.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dscope_core::{AppConfig, KeyPair};
use reqwest::Client;
use serde::Deserialize;

use crate::error::XApiError;

/// OAuth 2.0 client-credentials token endpoints, in preference order.
pub const CLIENT_CREDENTIALS_TOKEN_URLS: &[&str] = &[
    "https://api.x.com/2/oauth2/token",
    "https://api.twitter.com/2/oauth2/token",
];

/// App-only (consumer key) token endpoints, in preference order.
pub const CONSUMER_KEY_TOKEN_URLS: &[&str] = &[
    "https://api.x.com/oauth2/token",
    "https://api.twitter.com/oauth2/token",
];

/// Tokens are treated as expired this long before the advertised expiry.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Which strategy produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    ClientCredentials,
    ConsumerKey,
    Static,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientCredentials => write!(f, "client_credentials"),
            Self::ConsumerKey => write!(f, "consumer_key"),
            Self::Static => write!(f, "static"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub source: TokenSource,
    /// `None` means the token is used until the API rejects it.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[redacted]")
            .field("source", &self.source)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// One way of obtaining a bearer token.
#[async_trait]
pub trait CredentialStrategy: Send + Sync {
    fn source(&self) -> TokenSource;

    async fn acquire(&self, http: &Client, now: DateTime<Utc>) -> Result<AccessToken, XApiError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Exchanges an id/secret pair for a bearer token with
/// `grant_type=client_credentials`, trying each endpoint in turn.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    source: TokenSource,
    pair: KeyPair,
    token_urls: Vec<String>,
}

impl TokenGrant {
    #[must_use]
    pub fn client_credentials(pair: KeyPair) -> Self {
        Self {
            source: TokenSource::ClientCredentials,
            pair,
            token_urls: CLIENT_CREDENTIALS_TOKEN_URLS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    #[must_use]
    pub fn consumer_key(pair: KeyPair) -> Self {
        Self {
            source: TokenSource::ConsumerKey,
            pair,
            token_urls: CONSUMER_KEY_TOKEN_URLS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Replace the endpoint list (for pointing at a mock server in tests).
    #[must_use]
    pub fn with_token_urls(mut self, urls: Vec<String>) -> Self {
        self.token_urls = urls;
        self
    }

    async fn exchange(
        &self,
        http: &Client,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, XApiError> {
        let response = http
            .post(url)
            .basic_auth(&self.pair.id, Some(&self.pair.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
            return Err(XApiError::from_body(status.as_u16(), &body));
        }

        let parsed: TokenResponse =
            serde_json::from_str(&text).map_err(|e| XApiError::Deserialize {
                context: format!("token exchange at {url}"),
                source: e,
            })?;

        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| XApiError::Credentials(format!("{url} returned no access_token")))?;

        let expires_at = parsed
            .expires_in
            .map(|secs| now + Duration::seconds((secs - EXPIRY_SKEW_SECS).max(0)));

        Ok(AccessToken {
            value,
            source: self.source,
            expires_at,
        })
    }
}

#[async_trait]
impl CredentialStrategy for TokenGrant {
    fn source(&self) -> TokenSource {
        self.source
    }

    async fn acquire(&self, http: &Client, now: DateTime<Utc>) -> Result<AccessToken, XApiError> {
        let mut last_error = None;
        for url in &self.token_urls {
            match self.exchange(http, url, now).await {
                Ok(token) => return Ok(token),
                Err(e) => {
                    tracing::debug!(source = %self.source, url = %url, error = %e, "token endpoint failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| XApiError::Credentials("no token endpoints configured".to_string())))
    }
}

/// A bearer token supplied through the environment, used as-is.
#[derive(Clone)]
pub struct StaticBearer {
    token: String,
}

impl StaticBearer {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialStrategy for StaticBearer {
    fn source(&self) -> TokenSource {
        TokenSource::Static
    }

    async fn acquire(&self, _http: &Client, _now: DateTime<Utc>) -> Result<AccessToken, XApiError> {
        Ok(AccessToken {
            value: self.token.clone(),
            source: TokenSource::Static,
            expires_at: None,
        })
    }
}

/// Ordered list of strategies; the first success wins.
#[derive(Default)]
pub struct CredentialChain {
    strategies: Vec<Box<dyn CredentialStrategy>>,
}

impl CredentialChain {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn CredentialStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the cascade from whichever credentials are configured:
    /// client credentials, then consumer key, then a static bearer token.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let mut strategies: Vec<Box<dyn CredentialStrategy>> = Vec::new();
        if let Some(pair) = &config.x_client_credentials {
            strategies.push(Box::new(TokenGrant::client_credentials(pair.clone())));
        }
        if let Some(pair) = &config.x_consumer_credentials {
            strategies.push(Box::new(TokenGrant::consumer_key(pair.clone())));
        }
        if let Some(token) = &config.x_bearer_token {
            strategies.push(Box::new(StaticBearer::new(token.clone())));
        }
        Self::new(strategies)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Try each strategy in order.
    ///
    /// # Errors
    ///
    /// Returns [`XApiError::Credentials`] naming every strategy's failure when
    /// none succeeds, or when the chain is empty.
    pub async fn acquire(&self, http: &Client, now: DateTime<Utc>) -> Result<AccessToken, XApiError> {
        if self.strategies.is_empty() {
            return Err(XApiError::Credentials(
                "set X_CLIENT_ID/X_CLIENT_SECRET, X_CONSUMER_KEY/X_CONSUMER_SECRET or X_BEARER_TOKEN"
                    .to_string(),
            ));
        }

        let mut failures = Vec::new();
        for strategy in &self.strategies {
            match strategy.acquire(http, now).await {
                Ok(token) => {
                    tracing::info!(source = %token.source, "acquired X API bearer token");
                    return Ok(token);
                }
                Err(e) => {
                    tracing::warn!(source = %strategy.source(), error = %e, "credential strategy failed");
                    failures.push(format!("{}: {e}", strategy.source()));
                }
            }
        }
        Err(XApiError::Credentials(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn token_without_expiry_is_always_valid() {
        let token = AccessToken {
            value: "t".to_string(),
            source: TokenSource::Static,
            expires_at: None,
        };
        assert!(token.is_valid_at(Utc::now()));
    }

    #[test]
    fn token_expires_at_boundary() {
        let expiry = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let token = AccessToken {
            value: "t".to_string(),
            source: TokenSource::ClientCredentials,
            expires_at: Some(expiry),
        };
        assert!(token.is_valid_at(expiry - Duration::seconds(1)));
        assert!(!token.is_valid_at(expiry));
    }

    #[test]
    fn debug_redacts_token_value() {
        let token = AccessToken {
            value: "super-secret".to_string(),
            source: TokenSource::Static,
            expires_at: None,
        };
        assert!(!format!("{token:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn empty_chain_reports_missing_configuration() {
        let chain = CredentialChain::default();
        let err = chain.acquire(&Client::new(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, XApiError::Credentials(ref m) if m.contains("X_BEARER_TOKEN")));
    }

    #[tokio::test]
    async fn static_bearer_never_expires() {
        let chain = CredentialChain::new(vec![Box::new(StaticBearer::new("env-token"))]);
        let token = chain.acquire(&Client::new(), Utc::now()).await.unwrap();
        assert_eq!(token.value, "env-token");
        assert_eq!(token.source, TokenSource::Static);
        assert!(token.expires_at.is_none());
    }
}
