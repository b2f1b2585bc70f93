//! Row-level change notifications.
//!
//! A [`ChangeFeed`] yields [`ChangeEvent`]s for a table. Backends without
//! notifications simply do not expose one.

mod event;
mod sse;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub use event::{parse_change_event, ChangeEvent, ChangeKind};
pub use sse::{parse_sse_message, SseDecoder, SseMessage};

/// Table whose changes drive cache reconciliation.
pub const BOOKINGS_TABLE: &str = "desk_bookings";

/// Errors raised while subscribing to or reading a change feed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Subscription failed: {0}")]
    Connect(String),
    #[error("Change stream failed: {0}")]
    Stream(String),
    #[error("Malformed change event: {0}")]
    Malformed(String),
}

/// Stream of change events for one subscription.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, SubscriptionError>>;

/// Source of change notifications.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Opens a subscription to changes of `table`.
    ///
    /// The stream ends when the server closes the connection.
    async fn subscribe(&self, table: &str) -> Result<ChangeStream, SubscriptionError>;
}
