//! Mini Cache - In-memory caching primitives
//!
//! Provides a hash map with per-entry TTL expiration and a fixed-capacity
//! cache with LRU eviction. Both are synchronous and single-threaded; wrap
//! them in a lock when sharing across threads.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Clock, LruCache, ManualClock, MonotonicClock, TtlCacheMap};
pub use config::Config;
pub use error::{CacheError, Result};
