//! Local document-store backend.

mod repository;

pub use repository::LocalStore;
