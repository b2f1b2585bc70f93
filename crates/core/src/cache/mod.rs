//! Query-cache keys, invalidation scopes and the cache trait.

mod error;
mod keys;
mod scope;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{QueryKey, QueryKind};
pub use scope::{InvalidationEvent, InvalidationScope};
pub use serialization::{decode, encode};
pub use traits::QueryCache;
