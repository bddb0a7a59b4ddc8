//! LRU Cache Module
//!
//! Fixed-capacity cache with least-recently-used eviction.
//!
//! Entries live in an arena and are chained into a doubly-linked recency list
//! by index:
//! - Head = Most recently used
//! - Tail = Least recently used
//!
//! The key map stores arena indices, so lookup, promotion and eviction are all
//! O(1) on average. Evicted slots are reused by the entry that displaced them.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::trace;

use crate::config::{validate_capacity, Config};
use crate::error::Result;

// == LRU Node ==
#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    /// Neighbour towards the MRU end
    prev: Option<usize>,
    /// Neighbour towards the LRU end
    next: Option<usize>,
}

// == LRU Cache ==
/// Tracks access order for LRU eviction strategy.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Fails with `CacheError::InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;

        Ok(Self {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
        })
    }

    /// Creates a cache sized by `Config::lru_capacity`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.lru_capacity)
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        if self.capacity > 1 {
            self.promote(idx);
        }
        Some(&self.nodes[idx].value)
    }

    // == Put ==
    /// Stores `value` under `key` and marks it most recently used.
    ///
    /// A new key arriving at a full cache evicts the least recently used entry.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.promote(idx);
            return;
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };

        let evicted = if self.map.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };
        let idx = match evicted {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.map.insert(key, idx);
        self.push_front(idx);
    }

    // == Peek ==
    /// Returns the value for `key` without touching the recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Returns the next eviction candidate.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|idx| {
            let node = &self.nodes[idx];
            (&node.key, &node.value)
        })
    }

    // == Contains ==
    /// Checks if a key is cached, without promoting it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    // == List Maintenance ==
    /// Moves an entry to the MRU end. No-op when it is already there.
    fn promote(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    /// Detaches an entry, patching its neighbours and the head/tail markers.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.nodes[idx];
            (node.prev, node.next)
        };

        match prev {
            Some(prev_idx) => self.nodes[prev_idx].next = next,
            None => self.head = next,
        }
        match next {
            Some(next_idx) => self.nodes[next_idx].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[idx];
        node.prev = None;
        node.next = None;
    }

    /// Splices a detached entry in front of the current MRU entry.
    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].next = self.head;
        if let Some(head_idx) = self.head {
            self.nodes[head_idx].prev = Some(idx);
        }
        self.head = Some(idx);

        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Drops the LRU entry and returns its now-free arena slot.
    fn evict_lru(&mut self) -> Option<usize> {
        let idx = self.tail?;
        self.unlink(idx);
        self.map.remove(&self.nodes[idx].key);
        trace!(capacity = self.capacity, "Evicted least recently used entry");
        Some(idx)
    }
}

impl<K, V> LruCache<K, V> {
    // == Length ==
    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Iterate ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.map.len(),
        }
    }
}

// == Iterator ==
/// Iterator over `(key, value)` pairs in recency order, MRU first.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.cursor?];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    fn keys(cache: &LruCache<i32, i32>) -> Vec<i32> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    /// Walks the list in both directions and checks it against the key map.
    fn assert_links_consistent(cache: &LruCache<i32, i32>) {
        let mut forward = Vec::new();
        let mut cursor = cache.head;
        while let Some(idx) = cursor {
            forward.push(idx);
            cursor = cache.nodes[idx].next;
        }

        let mut backward = Vec::new();
        let mut cursor = cache.tail;
        while let Some(idx) = cursor {
            backward.push(idx);
            cursor = cache.nodes[idx].prev;
        }
        backward.reverse();

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), cache.map.len());
        assert!(cache.map.len() <= cache.capacity);
        assert_eq!(cache.head.is_none(), cache.map.is_empty());
        assert_eq!(cache.tail.is_none(), cache.map.is_empty());
        for (key, &idx) in &cache.map {
            assert_eq!(cache.nodes[idx].key, *key);
        }
    }

    #[test]
    fn test_lru_new() {
        let cache: LruCache<i32, i32> = LruCache::new(3).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.capacity(), 3);
        assert!(cache.peek_lru().is_none());
    }

    #[test]
    fn test_lru_zero_capacity_rejected() {
        let result: Result<LruCache<i32, i32>> = LruCache::new(0);
        assert!(matches!(result, Err(CacheError::InvalidCapacity(_))));
    }

    #[test]
    fn test_lru_get_missing() {
        let mut cache: LruCache<i32, i32> = LruCache::new(2).unwrap();
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_lru_capacity_bound() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&2));
        assert_eq!(cache.get(&3), Some(&3));
        assert_eq!(cache.len(), 2);
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_get_promotes() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(&1), Some(&1));
        cache.put(3, 3);

        // Key 2 was least recently used
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(&1));
        assert_eq!(cache.get(&3), Some(&3));
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_put_existing_overwrites_and_promotes() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(1, 10);
        cache.put(3, 3);

        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 2);
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut cache = LruCache::new(1).unwrap();

        cache.put(1, 1);
        assert_eq!(cache.get(&1), Some(&1));

        cache.put(2, 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&2));

        cache.put(2, 20);
        assert_eq!(cache.get(&2), Some(&20));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek_lru(), Some((&2, &20)));
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_promote_tail_middle_and_head() {
        let mut cache = LruCache::new(4).unwrap();
        for key in 1..=4 {
            cache.put(key, key);
        }
        assert_eq!(keys(&cache), vec![4, 3, 2, 1]);

        // Tail
        cache.get(&1);
        assert_eq!(keys(&cache), vec![1, 4, 3, 2]);
        assert_links_consistent(&cache);

        // Interior
        cache.get(&3);
        assert_eq!(keys(&cache), vec![3, 1, 4, 2]);
        assert_links_consistent(&cache);

        // Head
        cache.get(&3);
        assert_eq!(keys(&cache), vec![3, 1, 4, 2]);
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_eviction_reuses_slots() {
        let mut cache = LruCache::new(3).unwrap();
        for key in 0..10 {
            cache.put(key, key * 2);
        }

        assert_eq!(cache.nodes.len(), 3);
        assert_eq!(keys(&cache), vec![9, 8, 7]);
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_peek_does_not_promote() {
        let mut cache = LruCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.peek(&1), Some(&1));
        assert!(cache.contains_key(&1));
        cache.put(3, 3);

        assert!(!cache.contains_key(&1));
        assert_eq!(cache.peek_lru(), Some((&2, &2)));
    }

    #[test]
    fn test_lru_iter_order_and_len() {
        let mut cache = LruCache::new(3).unwrap();
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        cache.get(&2);

        let iter = cache.iter();
        assert_eq!(iter.len(), 3);
        let pairs: Vec<(i32, i32)> = iter.map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(2, 20), (3, 30), (1, 10)]);
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = LruCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, 2);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert_links_consistent(&cache);

        cache.put(3, 3);
        assert_eq!(keys(&cache), vec![3]);
        assert_links_consistent(&cache);
    }

    #[test]
    fn test_lru_borrowed_keys() {
        let mut cache: LruCache<String, u32> = LruCache::new(2).unwrap();
        cache.put("a".to_string(), 1);

        assert_eq!(cache.get("a"), Some(&1));
        assert!(cache.contains_key("a"));
        assert_eq!(cache.peek("b"), None);
    }

    #[test]
    fn test_lru_from_config() {
        let config = Config {
            lru_capacity: 5,
            ..Config::default()
        };
        let cache: LruCache<i32, i32> = LruCache::from_config(&config).unwrap();
        assert_eq!(cache.capacity(), 5);
    }
}
