//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod clock;
mod entry;
mod lru;
mod ttl_map;


// Re-export public types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use entry::CacheEntry;
pub use lru::{Iter, LruCache};
pub use ttl_map::TtlCacheMap;

// == Public Constants ==
/// Default entry time-to-live in milliseconds
pub const DEFAULT_TTL_MS: u64 = 60_000;

/// Default bucket count of a new TTL map
pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// Default occupancy ratio that doubles the bucket count
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Default LRU cache capacity
pub const DEFAULT_LRU_CAPACITY: usize = 1000;
