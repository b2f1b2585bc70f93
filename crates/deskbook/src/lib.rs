//! deskbook - desk reservations, expenses and a waiting list for a coworking
//! space, over a local document store or a hosted relational service.

pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod output;
pub mod realtime;
pub mod storage;
pub mod waitlist;

pub use config::{BackendKind, Config, ConfigError};
pub use context::StoreContext;
