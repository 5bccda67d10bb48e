use async_trait::async_trait;

use crate::error::StoreError;

/// Key-value store with per-key expiry.
///
/// Values are opaque strings; callers do their own encoding. Implementations
/// must treat an expired key exactly like an absent one.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value`, replacing any previous value and resetting the expiry
    /// to `ttl_secs` from now.
    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;
}
