//! Cached store decorator.
//!
//! The decorator implements the cache-aside pattern:
//!
//! - **Reads**: Check cache first, on miss fetch from the store and populate cache
//! - **Writes**: Persist to the store, then invalidate the affected query scopes
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(LocalStore::new(storage, seed_desks(), SchemaVersion::V2));
//! let cache = Arc::new(MemoryQueryCache::new(1_000));
//!
//! let cached = CachedStore::new(store, cache, Duration::from_secs(300), 1);
//! ```

mod store;

pub use store::CachedStore;
