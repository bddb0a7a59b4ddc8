//! TTL Map Module
//!
//! Hash map with per-entry time-to-live, chained buckets and doubling growth.
//!
//! Every entry is stamped with the clock reading at insertion. Expired entries
//! are swept lazily at the start of each operation; nothing runs in the
//! background. Updating an existing key replaces its value but keeps the
//! original timestamp, so an entry always expires at its first deadline.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{
    CacheEntry, Clock, MonotonicClock, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR,
    DEFAULT_TTL_MS,
};
use crate::config::{validate_bucket_count, validate_load_factor, Config};
use crate::error::Result;

type Bucket<K, V> = Vec<CacheEntry<K, V>>;

// == TTL Cache Map ==
/// Chained hash map whose entries expire a fixed duration after insertion.
///
/// Keys cannot be null; use `Option<K>` as the key type when an absent key
/// must be storable.
#[derive(Debug, Clone)]
pub struct TtlCacheMap<K, V, S = RandomState> {
    /// Bucket chains, always a power-of-two count
    buckets: Vec<Bucket<K, V>>,
    /// Number of entries across all chains, dead ones included until swept
    len: usize,
    /// Bucket count restored by `clear`
    initial_capacity: usize,
    time_to_live: Duration,
    load_factor: f32,
    clock: Arc<dyn Clock>,
    hash_builder: S,
}

impl<K, V> TtlCacheMap<K, V, RandomState> {
    // == Constructors ==
    /// Creates a map with a 60 second TTL, 8 buckets and a 0.75 load factor.
    pub fn new() -> Self {
        Self {
            buckets: empty_buckets(DEFAULT_INITIAL_CAPACITY),
            len: 0,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            time_to_live: Duration::from_millis(DEFAULT_TTL_MS),
            load_factor: DEFAULT_LOAD_FACTOR,
            clock: Arc::new(MonotonicClock::new()),
            hash_builder: RandomState::new(),
        }
    }

    /// Creates a map with explicit options.
    ///
    /// # Errors
    /// Fails when `initial_capacity` is not a power of two or `load_factor`
    /// is not a finite positive number.
    pub fn with_options(
        time_to_live: Duration,
        initial_capacity: usize,
        load_factor: f32,
    ) -> Result<Self> {
        Self::with_options_and_hasher(
            time_to_live,
            initial_capacity,
            load_factor,
            RandomState::new(),
        )
    }

    /// Creates a map from the TTL options of a [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            config.time_to_live(),
            config.initial_capacity,
            config.load_factor,
        )
    }
}

impl<K, V> Default for TtlCacheMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> TtlCacheMap<K, V, S> {
    /// Creates a map with explicit options and a custom hasher.
    pub fn with_options_and_hasher(
        time_to_live: Duration,
        initial_capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Result<Self> {
        validate_bucket_count(initial_capacity)?;
        validate_load_factor(load_factor)?;

        Ok(Self {
            buckets: empty_buckets(initial_capacity),
            len: 0,
            initial_capacity,
            time_to_live,
            load_factor,
            clock: Arc::new(MonotonicClock::new()),
            hash_builder,
        })
    }

    /// Replaces the time source. Intended to be called before any insert.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // == Accessors ==
    pub fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    /// Changes the TTL applied to every entry, existing ones included.
    pub fn set_time_to_live(&mut self, time_to_live: Duration) {
        self.time_to_live = time_to_live;
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Current number of bucket chains.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl<K, V, S> TtlCacheMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    // == Put ==
    /// Stores `value` under `key`, returning the previous live value if any.
    ///
    /// An existing entry keeps its creation timestamp.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.maintain();

        let now = self.clock.now();
        let index = bucket_index(&self.hash_builder, &key, self.buckets.len());
        let bucket = &mut self.buckets[index];

        if let Some(entry) = bucket.iter_mut().find(|entry| entry.key == key) {
            return Some(std::mem::replace(&mut entry.value, value));
        }

        bucket.push(CacheEntry::new(key, value, now));
        self.len += 1;
        None
    }

    // == Get ==
    /// Returns the live value stored under `key`.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.maintain();

        let index = bucket_index(&self.hash_builder, key, self.buckets.len());
        self.buckets[index]
            .iter()
            .find(|entry| Borrow::<Q>::borrow(&entry.key) == key)
            .map(|entry| &entry.value)
    }

    // == Contains ==
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Scans every live entry for a value equal to `value`.
    pub fn contains_value(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.maintain();

        self.buckets
            .iter()
            .flatten()
            .any(|entry| entry.value == *value)
    }

    // == Remove ==
    /// Unlinks the entry for `key` from its chain, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.maintain();

        let index = bucket_index(&self.hash_builder, key, self.buckets.len());
        let bucket = &mut self.buckets[index];
        let position = bucket
            .iter()
            .position(|entry| Borrow::<Q>::borrow(&entry.key) == key)?;

        self.len -= 1;
        Some(bucket.remove(position).value)
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&mut self) -> usize {
        self.sweep_expired();
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&mut self) -> bool {
        self.maintain();
        self.len == 0
    }

    // == Clear ==
    /// Drops every entry and shrinks back to the initial bucket count.
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.initial_capacity);
        self.len = 0;
        debug!(buckets = self.initial_capacity, "TTL map cleared");
    }

    // == Clear Expired ==
    /// Forces an expiration sweep followed by a growth check.
    pub fn clear_expired(&mut self) {
        self.maintain();
    }

    // == Internal Maintenance ==
    fn maintain(&mut self) {
        self.sweep_expired();
        self.grow_if_needed();
    }

    /// Removes dead entries, keeping the order of survivors in each chain.
    fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.time_to_live;
        let mut removed = 0;

        for bucket in &mut self.buckets {
            let before = bucket.len();
            bucket.retain(|entry| !entry.is_expired(now, ttl));
            removed += before - bucket.len();
        }

        if removed > 0 {
            self.len -= removed;
            trace!(removed, remaining = self.len, "Swept expired entries");
        }
        removed
    }

    /// Doubles the bucket count once occupancy reaches the load factor.
    ///
    /// The new table is filled completely before it replaces the old one.
    /// Entries keep their timestamps; chain order is not preserved.
    fn grow_if_needed(&mut self) {
        let old_count = self.buckets.len();
        if (self.len as f32) / (old_count as f32) < self.load_factor {
            return;
        }
        let Some(new_count) = old_count.checked_mul(2) else {
            return;
        };

        let mut grown = empty_buckets(new_count);
        for entry in std::mem::take(&mut self.buckets).into_iter().flatten() {
            let index = bucket_index(&self.hash_builder, &entry.key, new_count);
            grown[index].push(entry);
        }
        self.buckets = grown;

        debug!(
            from = old_count,
            to = new_count,
            entries = self.len,
            "TTL map resized"
        );
    }
}

// == Utility Functions ==
fn empty_buckets<K, V>(count: usize) -> Vec<Bucket<K, V>> {
    (0..count).map(|_| Vec::new()).collect()
}

/// Spreads the high bits of the hash into the low bits, then masks.
///
/// `bucket_count` must be a power of two.
fn bucket_index<Q, S>(hash_builder: &S, key: &Q, bucket_count: usize) -> usize
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    let hash = hash_builder.hash_one(key);
    ((hash ^ (hash >> 16)) as usize) & (bucket_count - 1)
}
