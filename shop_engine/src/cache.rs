//! Read-through caching for catalog lookups.
//!
//! [`CacheStore`] is the seam: the catalog API is generic over it, so a deployment can swap the in-process
//! [`InMemoryCache`] for a shared store without touching the engine. Only read-only catalog data goes through a cache.
//! Orders and payment state are always read from the database.
//!
//! The trait is synchronous so that stores can be shared with event hooks, which must be `Send`.
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::{Duration, Instant},
};

use log::*;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

pub trait CacheStore<V: Clone>: Send + Sync {
    /// Returns the cached value for `key`, if there is one and it has not expired.
    fn get(&self, key: &str) -> Option<V>;

    fn insert(&self, key: &str, value: V);

    fn invalidate(&self, key: &str);

    /// Removes every entry whose key starts with `prefix`.
    fn invalidate_prefix(&self, prefix: &str);

    fn clear(&self);
}

struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

/// An in-process cache where every entry lives for a fixed time-to-live.
pub struct InMemoryCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for InMemoryCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl<V> InMemoryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock only means another thread panicked mid-update. The map itself is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V: Clone + Send + Sync> CacheStore<V> for InMemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.read();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                trace!("🧊️ Cache hit for {key}");
                Some(entry.value.clone())
            },
            Some(_) => {
                trace!("🧊️ Cache entry for {key} has expired");
                None
            },
            None => None,
        }
    }

    fn insert(&self, key: &str, value: V) {
        let mut entries = self.write();
        entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        entries.insert(key.to_string(), CacheEntry { stored_at: Instant::now(), value });
    }

    fn invalidate(&self, key: &str) {
        if self.write().remove(key).is_some() {
            trace!("🧊️ Invalidated cache entry {key}");
        }
    }

    fn invalidate_prefix(&self, prefix: &str) {
        self.write().retain(|k, _| !k.starts_with(prefix));
    }

    fn clear(&self) {
        self.write().clear();
        debug!("🧊️ Cache cleared");
    }
}
