use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::store::KvStore;
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;

// value + absolute expiry in epoch millis
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: i64,
}

/// In-process store for a single gateway instance.
///
/// Expired entries are dropped when read, and by `purge_expired` which the
/// server runs on an interval.
pub struct MemoryStore {
    entries: DashMap<String, StoredValue>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, stored| stored.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now_millis();

        // remove_if keeps the check and the removal under one shard lock
        if self
            .entries
            .remove_if(key, |_, stored| stored.expires_at <= now)
            .is_some()
        {
            return Ok(None);
        }

        Ok(self.entries.get(key).map(|stored| stored.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let expires_at = self
            .clock
            .now_millis()
            .saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX).saturating_mul(1000));

        self.entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
