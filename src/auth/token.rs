//! Bearer token information.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Safety margin for token expiry checks (60 seconds).
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;

/// A bearer token and its expiry.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BearerToken {
    /// The access token sent on authenticated calls.
    pub access_token: String,

    /// Unix timestamp when the token expires, if known.
    pub expires_at: Option<i64>,
}

impl BearerToken {
    /// Create a token with an absolute expiry.
    pub fn new(access_token: impl Into<String>, expires_at: Option<i64>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Check if the token is expired or about to expire at `now`.
    ///
    /// Returns `true` within the safety margin. A token without an expiry
    /// never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(exp) => exp <= now + EXPIRY_SAFETY_MARGIN_SECS,
            None => false,
        }
    }

    /// Check if the token can be sent at `now`.
    #[must_use]
    pub fn is_usable_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(now)
    }

    /// Duration until the token expires, `Duration::ZERO` if expired or
    /// without expiry.
    pub fn time_until_expiry(&self, now: i64) -> Duration {
        match self.expires_at {
            Some(exp) if exp > now => Duration::from_secs((exp - now) as u64),
            _ => Duration::ZERO,
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
