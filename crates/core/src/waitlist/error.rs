use thiserror::Error;

/// Errors raised when a waiting-list entry is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitingListError {
    #[error("Waiting list entry name cannot be empty")]
    EmptyName,
}
