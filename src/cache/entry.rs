//! Cache Entry Module
//!
//! Defines the structure for individual TTL map entries.

use std::time::Duration;

// == Cache Entry ==
/// A key/value pair stamped with the clock reading at which it was created.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<K, V> {
    /// The lookup key
    pub key: K,
    /// The stored value
    pub value: V,
    /// Clock reading at creation, never refreshed by updates
    pub created_at: Duration,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    pub fn new(key: K, value: V, created_at: Duration) -> Self {
        Self {
            key,
            value,
            created_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at clock reading `now`.
    ///
    /// Boundary condition: an entry is dead once its age is greater than or
    /// equal to the TTL. A reading earlier than `created_at` counts as age zero.
    pub fn is_expired(&self, now: Duration, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }

    // == Age ==
    /// Returns how long the entry has existed at clock reading `now`.
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.created_at)
    }

    // == Time To Live ==
    /// Returns remaining lifetime at `now`, or zero once expired.
    pub fn ttl_remaining(&self, now: Duration, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.age(now))
    }
}
