//! Storage backend implementations.
//!
//! This module provides concrete implementations of the store traits defined
//! in `deskbook_core::storage`. The backend is chosen once at startup from
//! configuration and never mixed within a process.
//!
//! - `local`: JSON documents through a [`DocumentStorage`]
//! - `remote`: a hosted PostgREST service with a server-sent-events change feed

pub mod cached;
pub mod document;
pub mod local;
pub mod remote;

use std::sync::Arc;

use deskbook_core::booking::Desk;
use deskbook_core::storage::DeskStore;

use crate::config::{BackendKind, Config, ConfigError};

pub use cached::CachedStore;
pub use document::{DocumentStorage, FileDocumentStorage, MemoryDocumentStorage};
pub use local::LocalStore;
pub use remote::RemoteStore;

/// Builds the configured backend over the given desks.
pub fn build_backend(config: &Config, desks: Vec<Desk>) -> Result<Arc<dyn DeskStore>, ConfigError> {
    let store: Arc<dyn DeskStore> = match config.backend {
        BackendKind::Local => {
            let storage = Arc::new(FileDocumentStorage::new(&config.data_dir));
            Arc::new(LocalStore::new(storage, desks, config.schema_version))
        }
        BackendKind::Remote => {
            let settings = config
                .remote
                .as_ref()
                .ok_or(ConfigError::MissingRemoteSetting("DESKBOOK_REMOTE_URL"))?;
            Arc::new(RemoteStore::new(settings, desks, config.schema_version))
        }
    };

    tracing::info!(
        backend = %config.backend,
        schema_version = %config.schema_version,
        "Storage backend initialized"
    );
    Ok(store)
}

/// The document storage backing the waiting list.
///
/// The waiting list always lives in local documents, whichever backend holds
/// bookings and expenses.
pub fn build_document_storage(config: &Config) -> Arc<dyn DocumentStorage> {
    Arc::new(FileDocumentStorage::new(&config.data_dir))
}
