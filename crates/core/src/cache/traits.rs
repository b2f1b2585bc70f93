use std::time::Duration;

use async_trait::async_trait;

use super::{InvalidationScope, QueryKey, Result};

/// Store for serialized query results.
///
/// Every invalidation bumps a monotonically increasing epoch. A reader
/// captures the epoch before fetching and hands it back on `set`; the value
/// is only stored if no invalidation happened in between, so a slow read can
/// never resurrect data a concurrent mutation already invalidated.
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// Gets a fresh value. Entries past their TTL read as missing.
    async fn get(&self, key: &QueryKey) -> Result<Option<Vec<u8>>>;

    /// The current invalidation epoch.
    async fn epoch(&self) -> u64;

    /// Stores a value fetched while the epoch was `observed_epoch`.
    ///
    /// Returns `false` when the value was discarded as stale.
    async fn set(
        &self,
        key: &QueryKey,
        value: &[u8],
        ttl: Option<Duration>,
        observed_epoch: u64,
    ) -> Result<bool>;

    /// Drops every entry matched by the scope. Returns how many were dropped.
    async fn invalidate(&self, scope: &InvalidationScope) -> Result<usize>;

    /// Drops everything.
    async fn clear(&self) -> Result<()>;
}
