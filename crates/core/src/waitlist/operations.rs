use std::cmp::Ordering;

use super::error::WaitingListError;
use super::types::{NewWaitingListEntry, WaitingListEntry, WaitingListPatch};

/// Validates a new entry before it is stamped and stored.
pub fn validate_new_entry(entry: &NewWaitingListEntry) -> Result<(), WaitingListError> {
    if entry.name.trim().is_empty() {
        return Err(WaitingListError::EmptyName);
    }
    Ok(())
}

/// Merges the set fields of `patch` into `entry`.
///
/// The id and creation time never change. A patch that sets a blank name is
/// rejected and leaves the entry untouched.
pub fn apply_patch(
    entry: &WaitingListEntry,
    patch: WaitingListPatch,
) -> Result<WaitingListEntry, WaitingListError> {
    let mut updated = entry.clone();
    if let Some(name) = patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(WaitingListError::EmptyName);
        }
        updated.name = name.to_string();
    }
    if patch.email.is_some() {
        updated.email = patch.email;
    }
    if patch.phone.is_some() {
        updated.phone = patch.phone;
    }
    if patch.desired_start.is_some() {
        updated.desired_start = patch.desired_start;
    }
    if patch.notes.is_some() {
        updated.notes = patch.notes;
    }
    Ok(updated)
}

/// Newest first. Entries created in the same instant fall back to id order,
/// which starts with the millisecond timestamp.
pub fn sort_entries_desc(entries: &mut [WaitingListEntry]) {
    entries.sort_by(compare_desc);
}

fn compare_desc(a: &WaitingListEntry, b: &WaitingListEntry) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
