//! Realtime cache reconciliation.
//!
//! Subscribes once to booking changes. Every notification, whatever its
//! payload, invalidates the booking-derived query scopes over all periods.
//! The listener hands events to a single consumer task through a bounded
//! channel; when the channel is full the event is dropped, since a pending
//! invalidation already covers it.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use deskbook_core::cache::{InvalidationEvent, InvalidationScope, QueryCache};
use deskbook_core::realtime::{ChangeEvent, ChangeFeed, BOOKINGS_TABLE};
use deskbook_core::storage::DeskStore;

/// Maps a change notification to the invalidation it triggers.
pub fn invalidation_for(change: &ChangeEvent) -> InvalidationEvent {
    InvalidationEvent::new(change.table.clone(), InvalidationScope::all_bookings())
}

/// Handle owning the listener and consumer tasks.
///
/// Dropping it aborts both tasks.
#[derive(Debug)]
pub struct RealtimeSync {
    listener: JoinHandle<()>,
    consumer: JoinHandle<()>,
}

impl RealtimeSync {
    /// Starts reconciliation if the store exposes a change feed.
    ///
    /// Returns `None`, after logging why, when the backend cannot notify.
    pub fn start(
        store: &dyn DeskStore,
        cache: Arc<dyn QueryCache>,
        capacity: usize,
    ) -> Option<Self> {
        if !store.capabilities().subscribe {
            tracing::warn!("Backend has no change feed, realtime reconciliation disabled");
            return None;
        }
        let Some(feed) = store.change_feed() else {
            tracing::warn!("Backend reported subscribe capability without a change feed");
            return None;
        };
        Some(Self::spawn(feed, cache, capacity))
    }

    /// Spawns the listener and consumer tasks for `feed`.
    pub fn spawn(feed: Arc<dyn ChangeFeed>, cache: Arc<dyn QueryCache>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let consumer = tokio::spawn(consume(rx, cache));
        let listener = tokio::spawn(listen(feed, tx));
        Self { listener, consumer }
    }

    /// Returns true once both tasks have stopped.
    pub fn is_finished(&self) -> bool {
        self.listener.is_finished() && self.consumer.is_finished()
    }
}

impl Drop for RealtimeSync {
    fn drop(&mut self) {
        self.listener.abort();
        self.consumer.abort();
    }
}

async fn listen(feed: Arc<dyn ChangeFeed>, tx: mpsc::Sender<InvalidationEvent>) {
    let mut stream = match feed.subscribe(BOOKINGS_TABLE).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(table = BOOKINGS_TABLE, error = %err, "Realtime subscription failed");
            return;
        }
    };

    while let Some(change) = stream.next().await {
        match change {
            Ok(change) => {
                tracing::debug!(kind = %change.kind, table = %change.table, "Change received");
                match tx.try_send(invalidation_for(&change)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::trace!("Invalidation channel full, dropping event");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }
            Err(err) => tracing::warn!(error = %err, "Ignoring bad change notification"),
        }
    }

    tracing::warn!(table = BOOKINGS_TABLE, "Realtime change feed ended");
}

async fn consume(mut rx: mpsc::Receiver<InvalidationEvent>, cache: Arc<dyn QueryCache>) {
    while let Some(event) = rx.recv().await {
        match cache.invalidate(&event.scope).await {
            Ok(dropped) => {
                tracing::debug!(source = %event.source, dropped, "Realtime invalidation applied")
            }
            Err(err) => tracing::warn!(
                source = %event.source,
                error = %err,
                "Realtime invalidation failed"
            ),
        }
    }
}
