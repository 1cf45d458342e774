//! Concurrent keyed store of timestamped values.

use crate::gateway::domain::CacheEntry;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

/// Internally synchronized map of [`CacheEntry`] values.
///
/// Reads and writes lock only the shard holding the key. Returned entries
/// are clones, so no shard guard outlives a call.
#[derive(Debug)]
pub struct EntityCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for EntityCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> EntityCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry stored under `key`, expired or not.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the entry stored under `key` when it is younger than `ttl`.
    #[must_use]
    pub fn get_fresh(&self, key: &K, ttl: Duration, now: DateTime<Utc>) -> Option<CacheEntry<V>> {
        self.get(key).filter(|entry| !entry.is_expired(ttl, now))
    }

    /// Stores `value` under `key`, stamped with `now`.
    pub fn put(&self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry::new(value, now));
    }

    /// Removes the entry stored under `key`.
    pub fn remove(&self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    /// Drops every entry whose key is not in `keys`.
    ///
    /// Returns the number of entries evicted.
    pub fn retain_only(&self, keys: &HashSet<K>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keys.contains(key));
        before.saturating_sub(self.entries.len())
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether an entry is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}
