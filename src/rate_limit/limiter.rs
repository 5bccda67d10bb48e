//! Sliding-window admission check.
//!
//! Each (client identity, endpoint label) pair owns one record in the store:
//! a JSON array of millisecond timestamps for the requests admitted within
//! the trailing window. Stale timestamps are dropped when the record is read
//! and the record itself expires through the store's TTL, so nothing here
//! deletes keys.
//!
//! The read-modify-write is not atomic. Concurrent checks for the same key
//! can read the same state and both be admitted at the limit boundary.

use std::sync::Arc;

use tracing::{debug, trace};

use super::store::KvStore;
use crate::clock::Clock;
use crate::error::StoreError;

const DEFAULT_KEY_PREFIX: &str = "ratelimit";

/// Longest window whose length still fits in i64 milliseconds.
pub const MAX_WINDOW_SECS: u64 = i64::MAX as u64 / 1000;

/// Quota for one limiter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Maximum admitted requests per window
    pub limit: u32,
    /// Trailing window length in seconds
    pub window_secs: u64,
}

impl WindowConfig {
    pub fn new(limit: u32, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    fn window_millis(&self) -> i64 {
        i64::try_from(self.window_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }
}

/// Outcome of a `check_limit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Advisory; counts the request just admitted.
    pub remaining: u32,
}

impl RateLimitDecision {
    fn rejected() -> Self {
        Self {
            allowed: false,
            remaining: 0,
        }
    }
}

pub struct SlidingWindowLimiter {
    config: WindowConfig,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    key_prefix: String,
}

impl SlidingWindowLimiter {
    pub fn new(config: WindowConfig, store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Namespace keys, e.g. when several deployments share one Redis.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn config(&self) -> WindowConfig {
        self.config
    }

    /// Admit or reject one request for `client_identity` on `endpoint_label`.
    ///
    /// Rejections are not recorded, so a client retrying while over budget
    /// does not push its own window forward. Store failures are returned
    /// as-is; what to do about them is the caller's policy.
    pub async fn check_limit(
        &self,
        client_identity: &str,
        endpoint_label: &str,
    ) -> Result<RateLimitDecision, StoreError> {
        let key = self.record_key(client_identity, endpoint_label);
        let now = self.clock.now_millis();
        let window_start = now.saturating_sub(self.config.window_millis());

        let mut timestamps = match self.store.get(&key).await? {
            Some(raw) => decode_record(&raw)?,
            None => Vec::new(),
        };
        timestamps.retain(|&ts| ts > window_start);

        trace!(key = %key, in_window = timestamps.len(), "Checking rate limit");

        if timestamps.len() >= self.config.limit as usize {
            debug!(
                key = %key,
                limit = self.config.limit,
                "Rate limit exceeded"
            );
            return Ok(RateLimitDecision::rejected());
        }

        timestamps.push(now);
        self.store
            .put(&key, &encode_record(&timestamps), self.config.window_secs)
            .await?;

        Ok(RateLimitDecision {
            allowed: true,
            remaining: self.config.limit - timestamps.len() as u32,
        })
    }

    fn record_key(&self, client_identity: &str, endpoint_label: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, endpoint_label, client_identity)
    }
}

fn decode_record(raw: &str) -> Result<Vec<i64>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn encode_record(timestamps: &[i64]) -> String {
    // a Vec<i64> always serializes
    serde_json::to_string(timestamps).unwrap_or_else(|_| "[]".to_string())
}
