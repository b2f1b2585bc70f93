mod error;
mod operations;
mod types;

pub use error::WaitingListError;
pub use operations::{apply_patch, sort_entries_desc, validate_new_entry};
pub use types::{NewWaitingListEntry, WaitingListEntry, WaitingListPatch};
