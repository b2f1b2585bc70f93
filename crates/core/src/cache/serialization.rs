//! Pure functions for serializing/deserializing query results to/from cache bytes.
//!
//! Values are stored as JSON so cached results stay easy to inspect.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheError, Result};

/// Serializes a query result to JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes JSON bytes to a query result.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}
