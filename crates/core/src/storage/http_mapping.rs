//! Pure functions for mapping HTTP status codes to persistence errors.
//!
//! The remote backend talks to a hosted relational service over HTTP. Its
//! non-success responses are classified here so the mapping stays testable
//! without a network.

use super::PersistenceError;

/// Maps a non-success HTTP status code to a [`PersistenceError`].
///
/// - `401`, `403` -> `Unauthorized`
/// - `413`, `507` -> `QuotaExceeded`
/// - `408`, `502`, `503`, `504` -> `Network`
/// - anything else -> `Remote`
///
/// # Examples
///
/// ```
/// use deskbook_core::storage::{status_code_to_persistence_error, PersistenceError};
///
/// let error = status_code_to_persistence_error(401, "JWT expired");
/// assert_eq!(error, PersistenceError::Unauthorized("JWT expired".to_string()));
/// ```
pub fn status_code_to_persistence_error(status: u16, message: &str) -> PersistenceError {
    match status {
        401 | 403 => PersistenceError::Unauthorized(message.to_string()),
        413 | 507 => PersistenceError::QuotaExceeded(message.to_string()),
        408 | 502 | 503 | 504 => PersistenceError::Network(format!("{status}: {message}")),
        _ => PersistenceError::Remote {
            status,
            message: message.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_statuses() {
        assert_eq!(
            status_code_to_persistence_error(401, "missing apikey"),
            PersistenceError::Unauthorized("missing apikey".to_string())
        );
        assert_eq!(
            status_code_to_persistence_error(403, "row level security"),
            PersistenceError::Unauthorized("row level security".to_string())
        );
    }

    #[test]
    fn test_quota_statuses() {
        assert!(matches!(
            status_code_to_persistence_error(413, "payload too large"),
            PersistenceError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_gateway_statuses_are_network_errors() {
        assert_eq!(
            status_code_to_persistence_error(503, "unavailable"),
            PersistenceError::Network("503: unavailable".to_string())
        );
    }

    #[test]
    fn test_other_statuses_are_remote_errors() {
        assert_eq!(
            status_code_to_persistence_error(409, "duplicate key"),
            PersistenceError::Remote {
                status: 409,
                message: "duplicate key".to_string()
            }
        );
    }
}
