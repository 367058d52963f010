use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted: Instant,
}

/// In-memory cache whose entries expire `ttl` after insertion.
///
/// Expired entries are evicted lazily on lookup or by [`TtlCache::purge_expired`].
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    ttl: Duration,
    entries: DashMap<K, Entry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key)
            && entry.inserted.elapsed() < self.ttl
        {
            return Some(entry.value.clone());
        }

        self.entries
            .remove_if(key, |_, entry| entry.inserted.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
            },
        );
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let fresh = entry.inserted.elapsed() < self.ttl;
            if !fresh {
                purged += 1;
            }
            fresh
        });
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
