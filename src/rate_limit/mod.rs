//! Sliding-window rate limiting backed by a shared key-value store.

mod limiter;
mod memory_store;
#[cfg(feature = "redis")]
mod redis_store;
mod store;

pub use limiter::{MAX_WINDOW_SECS, RateLimitDecision, SlidingWindowLimiter, WindowConfig};
pub use memory_store::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use store::KvStore;

/// Response header carrying the advisory remaining quota.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
