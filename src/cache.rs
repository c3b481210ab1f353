//! Time-bounded in-memory caches for resolved addresses, ABIs and contracts
//!
//! Each cache is a map behind its own read/write lock. Lookups take the
//! shared lock; inserts and evictions take the exclusive lock. An entry
//! older than the TTL is deleted before the lookup reports a miss, so no
//! caller ever sees stale data.
//!
//! Alongside the map each cache keeps an async mutex for every key with a
//! fetch in flight. A resolver holds the key lock across its fetch, so concurrent misses for the same
//! name share a single RPC round trip instead of racing.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tokio::time::{Duration, Instant};

/// Default time-to-live for cached entries
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// A cached value and the moment it was fetched
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    /// Valid while `now - fetched_at <= ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    inflight: InflightLocks,
}

type InflightLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Held while fetching a key; releases the key lock on drop
///
/// The last holder also removes the key's lock from the map, so the map only
/// ever holds keys with a fetch in progress or queued.
pub struct KeyGuard<'a> {
    inflight: &'a InflightLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock();
        drop(self.guard.take());
        // Waiters clone the lock under this map lock, so a count of one means
        // nobody else holds or awaits it.
        if inflight
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            inflight.remove(&self.key);
        }
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache; `name` only labels log lines
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key` if it is still fresh
    ///
    /// An expired entry is evicted before returning `None`.
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_fresh(self.ttl) => {
                    tracing::debug!("{} cache HIT for {}", self.name, key);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    tracing::debug!("{} cache MISS for {}", self.name, key);
                    return None;
                }
            }
        }

        let mut entries = self.entries.write();
        // Another writer may have refreshed the entry between the two locks.
        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(self.ttl) {
                return Some(entry.value.clone());
            }
            tracing::debug!("{} cache EXPIRED for {}", self.name, key);
            entries.remove(key);
        }
        None
    }

    /// Store `value` under `key`, stamped with the current time
    pub fn insert(&self, key: &str, value: V) {
        self.entries
            .write()
            .insert(key.to_string(), CacheEntry::new(value));
    }

    /// Drop the entry for `key`, if any
    pub fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, including any not yet evicted
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Acquire the fetch lock for `key`
    ///
    /// Callers re-check [`get`](Self::get) after acquiring it: a concurrent
    /// holder may already have filled the entry.
    pub async fn lock_key(&self, key: &str) -> KeyGuard<'_> {
        let lock = {
            let mut inflight = self.inflight.lock();
            inflight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        KeyGuard {
            inflight: &self.inflight,
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of keys with a fetch in progress or waiting
    pub fn pending_fetches(&self) -> usize {
        self.inflight.lock().len()
    }
}
