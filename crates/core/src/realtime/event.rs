use std::fmt;

use serde::{Deserialize, Serialize};

use super::SubscriptionError;

/// Kind of row-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "INSERT"),
            ChangeKind::Update => write!(f, "UPDATE"),
            ChangeKind::Delete => write!(f, "DELETE"),
        }
    }
}

/// A change notification for one table.
///
/// The row payload is deliberately not modelled. Consumers only learn that
/// something changed and refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
}

fn default_schema() -> String {
    "public".to_string()
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            schema: default_schema(),
            table: table.into(),
        }
    }
}

/// Parses the JSON `data:` payload of a change notification.
pub fn parse_change_event(data: &str) -> Result<ChangeEvent, SubscriptionError> {
    serde_json::from_str(data).map_err(|e| SubscriptionError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change_event() {
        let event =
            parse_change_event(r#"{"type":"DELETE","schema":"public","table":"desk_bookings"}"#)
                .unwrap();

        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.table, "desk_bookings");
    }

    #[test]
    fn test_parse_change_event_ignores_row_payload() {
        let event = parse_change_event(
            r#"{"type":"INSERT","table":"desk_bookings","record":{"id":"x"}}"#,
        )
        .unwrap();

        assert_eq!(event, ChangeEvent::new(ChangeKind::Insert, "desk_bookings"));
    }

    #[test]
    fn test_parse_change_event_rejects_unknown_kind() {
        let result = parse_change_event(r#"{"type":"TRUNCATE","table":"desk_bookings"}"#);
        assert!(matches!(result, Err(SubscriptionError::Malformed(_))));
    }
}
