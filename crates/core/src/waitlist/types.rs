use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::serde::{deserialize_optional_date, deserialize_optional_string};

/// A person waiting for a desk to free up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingListEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub desired_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

impl WaitingListEntry {
    /// Stamps a new entry with its id and creation time.
    pub fn from_new(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        new: NewWaitingListEntry,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            name: new.name.trim().to_string(),
            email: new.email,
            phone: new.phone,
            desired_start: new.desired_start,
            notes: new.notes,
        }
    }
}

/// The caller-supplied part of a waiting-list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWaitingListEntry {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub desired_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

impl NewWaitingListEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_desired_start(mut self, date: NaiveDate) -> Self {
        self.desired_start = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A partial update. Only fields that are `Some` are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingListPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub desired_start: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WaitingListPatch {
    /// Returns true if the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.desired_start.is_none()
            && self.notes.is_none()
    }
}
