//! Pure domain core for deskbook.
//!
//! Everything in this crate is free of I/O: entity types, validation, the
//! booking state machine, the recurring-expense generator, statistics, and the
//! traits that storage and cache backends implement in the `deskbook` crate.

pub mod booking;
pub mod cache;
pub mod expense;
pub mod realtime;
pub mod serde;
pub mod stats;
pub mod storage;
pub mod waitlist;
