//! Redis-backed store, shared by every gateway instance pointing at the same
//! server. Only built with the `redis` feature.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, RedisError};
use tracing::info;

use super::store::KvStore;
use crate::error::StoreError;

pub struct RedisStore {
    // ConnectionManager is a cheap clone over a multiplexed connection
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(store_error)?;

        info!(url = %url, "Connected to Redis rate limit store");
        Ok(Self { manager })
    }
}

// a value we cannot read as a string is a bad record, anything else is the
// store being unreachable
fn store_error(e: RedisError) -> StoreError {
    if e.kind() == ErrorKind::TypeError || e.code() == Some("WRONGTYPE") {
        StoreError::Malformed(e.to_string())
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>(key).await.map_err(store_error)
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(store_error)
    }
}
