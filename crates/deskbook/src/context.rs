//! Explicit store context.
//!
//! Owns the cached store, the query cache, the waiting list and the realtime
//! handle. There is no global instance; callers build one and pass it along.

use std::sync::Arc;

use deskbook_core::booking::seed_desks;
use deskbook_core::cache::QueryCache;
use deskbook_core::storage::DeskStore;

use crate::cache::MemoryQueryCache;
use crate::config::{Config, ConfigError};
use crate::realtime::RealtimeSync;
use crate::storage::{build_backend, build_document_storage, CachedStore};
use crate::waitlist::WaitingListStore;

/// Everything an operation needs to reach persistent state.
pub struct StoreContext {
    store: Arc<dyn DeskStore>,
    cache: Arc<MemoryQueryCache>,
    waitlist: WaitingListStore,
    realtime: Option<RealtimeSync>,
}

impl StoreContext {
    /// Builds the configured backend behind a fresh cache.
    ///
    /// Must be called inside a tokio runtime when the backend has a change
    /// feed, since reconciliation spawns its tasks immediately.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let backend = build_backend(config, seed_desks())?;
        let waitlist = WaitingListStore::new(build_document_storage(config));
        Ok(Self::with_store(backend, waitlist, config))
    }

    /// Wraps an already built backend. Used by tests to inject stores.
    pub fn with_store(
        backend: Arc<dyn DeskStore>,
        waitlist: WaitingListStore,
        config: &Config,
    ) -> Self {
        let cache = Arc::new(MemoryQueryCache::new(config.cache_max_entries));
        let realtime = RealtimeSync::start(
            backend.as_ref(),
            cache.clone(),
            config.realtime_channel_capacity,
        );

        let store: Arc<dyn DeskStore> = Arc::new(CachedStore::new(
            backend,
            cache.clone(),
            config.cache_ttl(),
            config.cache_read_retries,
        ));

        Self {
            store,
            cache,
            waitlist,
            realtime,
        }
    }

    /// The cached store.
    pub fn store(&self) -> &Arc<dyn DeskStore> {
        &self.store
    }

    pub fn cache(&self) -> Arc<dyn QueryCache> {
        self.cache.clone()
    }

    pub fn waitlist(&self) -> &WaitingListStore {
        &self.waitlist
    }

    /// Returns true if realtime reconciliation is running.
    pub fn is_realtime_enabled(&self) -> bool {
        self.realtime.is_some()
    }
}
