//! Waiting list persisted as a single local document.

use std::sync::Arc;

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;

use deskbook_core::storage::Result;
use deskbook_core::waitlist::{
    apply_patch, sort_entries_desc, validate_new_entry, NewWaitingListEntry, WaitingListEntry,
    WaitingListPatch,
};

use crate::storage::document::{load_collection, store_collection, DocumentStorage, WAITING_LIST_KEY};

const ID_SUFFIX_LEN: usize = 9;

/// Generates `"{unix_millis}-{9 alphanumerics}"`.
fn generate_entry_id(millis: i64) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{millis}-{}", suffix.to_lowercase())
}

/// People waiting for a desk.
///
/// Every mutation reads the whole document and writes it back. Concurrent
/// writers race and the last write wins.
#[derive(Clone)]
pub struct WaitingListStore {
    storage: Arc<dyn DocumentStorage>,
}

impl WaitingListStore {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self { storage }
    }

    /// All entries, newest first.
    pub async fn get_all_entries(&self) -> Result<Vec<WaitingListEntry>> {
        let records = load_collection::<WaitingListEntry>(self.storage.as_ref(), WAITING_LIST_KEY)
            .await?;
        let mut entries: Vec<WaitingListEntry> = records.into_values().collect();
        sort_entries_desc(&mut entries);
        Ok(entries)
    }

    /// Stamps and stores a new entry.
    pub async fn add_entry(&self, new: NewWaitingListEntry) -> Result<WaitingListEntry> {
        validate_new_entry(&new)?;

        let mut records =
            load_collection::<WaitingListEntry>(self.storage.as_ref(), WAITING_LIST_KEY).await?;
        let now = Utc::now();
        let entry = WaitingListEntry::from_new(generate_entry_id(now.timestamp_millis()), now, new);
        records.insert(entry.id.clone(), entry.clone());
        store_collection(self.storage.as_ref(), WAITING_LIST_KEY, &records).await?;

        tracing::debug!(id = %entry.id, "Waiting list entry added");
        Ok(entry)
    }

    /// Removes an entry. Returns `None` if it did not exist.
    pub async fn remove_entry(&self, id: &str) -> Result<Option<WaitingListEntry>> {
        let mut records =
            load_collection::<WaitingListEntry>(self.storage.as_ref(), WAITING_LIST_KEY).await?;
        let Some(removed) = records.remove(id) else {
            return Ok(None);
        };
        store_collection(self.storage.as_ref(), WAITING_LIST_KEY, &records).await?;

        tracing::debug!(id, "Waiting list entry removed");
        Ok(Some(removed))
    }

    /// Merges the set fields of `patch`. Returns `None` if the entry is absent.
    pub async fn update_entry(
        &self,
        id: &str,
        patch: WaitingListPatch,
    ) -> Result<Option<WaitingListEntry>> {
        let mut records =
            load_collection::<WaitingListEntry>(self.storage.as_ref(), WAITING_LIST_KEY).await?;
        let Some(existing) = records.get(id) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(existing.clone()));
        }

        let updated = apply_patch(existing, patch)?;
        records.insert(id.to_string(), updated.clone());
        store_collection(self.storage.as_ref(), WAITING_LIST_KEY, &records).await?;

        tracing::debug!(id, "Waiting list entry updated");
        Ok(Some(updated))
    }

    /// Removes every entry.
    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(WAITING_LIST_KEY).await?;
        tracing::debug!("Waiting list cleared");
        Ok(())
    }
}
