//! Per-[`Api`](crate::Api) bearer token cache.
//!
//! Thread-safe: uses `RwLock` internally. Refreshes run under the write lock,
//! so at most one token creation is in flight per cache and concurrent callers
//! wait for it and reuse its result.

use std::future::Future;

use tokio::sync::RwLock;
use tracing::debug;

use super::token::BearerToken;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct TokenCache {
    token: RwLock<Option<BearerToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached access token if it is usable at `now`.
    pub async fn current(&self, now: i64) -> Option<String> {
        let token = self.token.read().await;
        token
            .as_ref()
            .filter(|t| t.is_usable_at(now))
            .map(|t| t.access_token.clone())
    }

    /// Return a usable token, running `refresh` if there is none.
    pub async fn get_or_refresh<F, Fut>(&self, now: impl Fn() -> i64, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BearerToken>>,
    {
        if let Some(token) = self.current(now()).await {
            return Ok(token);
        }

        let mut token = self.token.write().await;

        // Double-check: another task may have refreshed while we waited for the lock
        if let Some(info) = token.as_ref().filter(|t| t.is_usable_at(now())) {
            debug!("Token refreshed by another caller");
            return Ok(info.access_token.clone());
        }

        let fresh = refresh().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    /// Run `refresh` under the write lock and cache its result, regardless
    /// of the cached token.
    pub async fn refresh_with<F, Fut>(&self, refresh: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<BearerToken>>,
    {
        let mut token = self.token.write().await;
        let fresh = refresh().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    /// Store `token`, replacing any cached one.
    pub async fn replace(&self, token: BearerToken) {
        *self.token.write().await = Some(token);
    }

    /// Drop the cached token.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    /// Drop the cached token only if it is still `access_token`.
    ///
    /// Returns `true` if the token was dropped. A token already replaced by a
    /// concurrent refresh is kept.
    pub async fn invalidate_if(&self, access_token: &str) -> bool {
        let mut token = self.token.write().await;
        if token.as_ref().is_some_and(|t| t.access_token == access_token) {
            *token = None;
            true
        } else {
            false
        }
    }

    /// Read-only snapshot of the cached token.
    pub async fn snapshot(&self) -> Option<BearerToken> {
        self.token.read().await.clone()
    }
}
