//! Single-slot bearer token cache shared across requests.

use std::sync::Arc;

use dscope_core::Clock;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::credentials::{AccessToken, CredentialChain, TokenSource};
use crate::error::XApiError;

/// Holds at most one token.
///
/// The slot lock is held across acquisition, so concurrent callers that find
/// the slot empty wait for a single exchange instead of racing their own.
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            clock,
        }
    }

    /// Return the cached token if still valid, otherwise run the chain and
    /// cache its result.
    ///
    /// # Errors
    ///
    /// Propagates the chain's [`XApiError::Credentials`] when every strategy fails.
    pub async fn get_or_acquire(
        &self,
        chain: &CredentialChain,
        http: &Client,
    ) -> Result<AccessToken, XApiError> {
        let mut slot = self.slot.lock().await;
        let now = self.clock.now();

        if let Some(token) = slot.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.clone());
        }

        let token = chain.acquire(http, now).await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drop `rejected` from the slot after the API refused it.
    ///
    /// Returns `false` for static tokens, which cannot be refreshed, so the
    /// caller knows a retry is pointless. The slot is only cleared if it
    /// still holds the rejected token; a newer token stored by a concurrent
    /// caller is kept.
    pub async fn invalidate(&self, rejected: &AccessToken) -> bool {
        if rejected.source == TokenSource::Static {
            return false;
        }
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|t| t.value == rejected.value) {
            *slot = None;
        }
        true
    }

    /// Snapshot of the cached token, if any.
    pub async fn current(&self) -> Option<AccessToken> {
        self.slot.lock().await.clone()
    }
}
