//! Size-bounded metadata caches keyed by contract address.

use alloy::primitives::Address;
use lru::LruCache;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::types::Token;

/// Default capacity of the pool validity and pool composition caches.
pub const DEFAULT_POOL_CACHE_CAPACITY: usize = 500;

/// Default capacity of the token metadata cache.
pub const DEFAULT_TOKEN_CACHE_CAPACITY: usize = 1000;

/// LRU cache from contract address to a resolved fact.
///
/// Entries never expire; the least recently used entry is evicted once
/// `capacity` is reached. All access goes through an async mutex so the cache
/// can be shared by concurrent transactions. Concurrent misses on one address
/// are coalesced by [`MetadataCache::get_or_try_insert_with`].
pub struct MetadataCache<V> {
    name: &'static str,
    entries: Mutex<LruCache<Address, V>>,
    in_flight: Mutex<HashMap<Address, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> MetadataCache<V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up `address`, promoting it to most recently used on a hit.
    pub async fn get(&self, address: &Address) -> Option<V> {
        let value = self.entries.lock().await.get(address).cloned();
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    /// Store `value`, evicting the least recently used entry if full.
    pub async fn insert(&self, address: Address, value: V) {
        self.entries.lock().await.put(address, value);
    }

    pub async fn contains(&self, address: &Address) -> bool {
        self.entries.lock().await.contains(address)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Return the cached value for `address`, or run `fetch` and cache its
    /// success.
    ///
    /// Only one fetch per address runs at a time; callers racing on the same
    /// miss wait for it and then read the cached value. A failed fetch is not
    /// cached, so a waiter behind it fetches again.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, address: Address, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&address).await {
            return Ok(value);
        }

        let slot = self.in_flight.lock().await.entry(address).or_default().clone();
        let guard = slot.lock().await;
        let cached = self.entries.lock().await.get(&address).cloned();
        let result = match cached {
            Some(value) => Ok(value),
            None => {
                let fetched = fetch().await;
                if let Ok(value) = &fetched {
                    self.insert(address, value.clone()).await;
                }
                fetched
            }
        };
        drop(guard);

        // Release the slot under the map lock so the last holder always sees
        // a count of two (the map and itself) and removes the entry.
        let mut in_flight = self.in_flight.lock().await;
        if Arc::strong_count(&slot) == 2 {
            in_flight.remove(&address);
        }
        drop(slot);
        drop(in_flight);
        result
    }

    /// Snapshot of hit/miss counters and current size.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        CacheStats {
            name: self.name,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub name: &'static str,
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The three caches owned by a [`Resolver`](crate::Resolver).
///
/// Built once per process and shared (behind an `Arc`) by every resolver that
/// should see the same facts.
pub struct ResolverCaches {
    /// Pool address -> whether its factory is the protocol factory.
    pub pool_validity: MetadataCache<bool>,
    /// Pool address -> (token0, token1).
    pub pool_tokens: MetadataCache<(Address, Address)>,
    /// Token address -> display metadata.
    pub tokens: MetadataCache<Token>,
}

impl ResolverCaches {
    pub fn new(pool_capacity: usize, token_capacity: usize) -> Self {
        Self {
            pool_validity: MetadataCache::new("pool_validity", pool_capacity),
            pool_tokens: MetadataCache::new("pool_tokens", pool_capacity),
            tokens: MetadataCache::new("tokens", token_capacity),
        }
    }

    pub async fn stats(&self) -> Vec<CacheStats> {
        vec![
            self.pool_validity.stats().await,
            self.pool_tokens.stats().await,
            self.tokens.stats().await,
        ]
    }
}

impl Default for ResolverCaches {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CACHE_CAPACITY, DEFAULT_TOKEN_CACHE_CAPACITY)
    }
}
