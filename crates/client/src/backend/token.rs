//! Tenant access tokens for the secondary registry.
//!
//! Tokens are re-acquired for every query unless caching is switched on.
//! The cache never hands out a token within [`EXPIRY_MARGIN_SECS`] of its
//! expiry, so a request cannot start with a token that dies in flight.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// Seconds before expiry at which a cached token is considered stale.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// A bearer token and the moment it stops being valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl TenantToken {
    /// Build a token from the registry's `expire` field (seconds from now).
    pub fn from_expire(value: String, expire_secs: Option<i64>, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: now + Duration::seconds(expire_secs.unwrap_or(0).max(0)),
        }
    }

    /// Whether the token can still be used for a request starting at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Single-slot token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<TenantToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token if it is still fresh at `now`.
    ///
    /// A stale token is dropped from the cache.
    pub async fn get(&self, now: DateTime<Utc>) -> Option<TenantToken> {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(token) if token.is_fresh(now) => Some(token.clone()),
            Some(_) => {
                log::debug!("[secondary] cached tenant token expired");
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub async fn store(&self, token: TenantToken) {
        *self.slot.lock().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }
}
