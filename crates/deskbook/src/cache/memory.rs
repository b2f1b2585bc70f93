//! In-memory query cache with LRU eviction.
//!
//! Entries expire lazily: an entry past its TTL reads as missing and is
//! replaced on the next successful fetch.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use deskbook_core::cache::{InvalidationScope, QueryCache, QueryKey, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

#[derive(Debug)]
struct State {
    store: LruCache<QueryKey, CacheEntry>,
    /// Bumped by every invalidation. Guarded by the same lock as `store` so a
    /// `set` can never slip in between an invalidation and its epoch bump.
    epoch: u64,
}

/// In-memory query cache.
///
/// Cloning is cheap and clones share the same store.
#[derive(Debug, Clone)]
pub struct MemoryQueryCache {
    state: Arc<RwLock<State>>,
}

impl MemoryQueryCache {
    /// Creates a cache that holds at most `max_entries` results.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Arc::new(RwLock::new(State {
                store: LruCache::new(capacity),
                epoch: 0,
            })),
        }
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QueryCache for MemoryQueryCache {
    async fn get(&self, key: &QueryKey) -> Result<Option<Vec<u8>>> {
        // LRU bookkeeping needs a write lock even for reads
        let mut state = self.state.write().await;

        match state.store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        state.store.pop(key);
        Ok(None)
    }

    async fn epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    async fn set(
        &self,
        key: &QueryKey,
        value: &[u8],
        ttl: Option<Duration>,
        observed_epoch: u64,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.epoch != observed_epoch {
            return Ok(false);
        }
        state
            .store
            .put(key.clone(), CacheEntry::new(value.to_vec(), ttl));
        Ok(true)
    }

    async fn invalidate(&self, scope: &InvalidationScope) -> Result<usize> {
        let mut state = self.state.write().await;
        state.epoch += 1;

        let keys_to_delete: Vec<QueryKey> = state
            .store
            .iter()
            .filter(|(key, _)| scope.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys_to_delete {
            state.store.pop(key);
        }

        Ok(keys_to_delete.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.store.clear();
        Ok(())
    }
}
