//! Hosted relational backend over a PostgREST-style API.

mod client;
mod feed;
mod repository;
mod rows;

pub use client::RestClient;
pub use feed::SseChangeFeed;
pub use repository::RemoteStore;
pub use rows::{BOOKINGS_TABLE, EXPENSES_TABLE, RECURRING_EXPENSES_TABLE};
