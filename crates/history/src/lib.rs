//! Recall Check History Crate
//!
//! Local, best-effort persistence for the lookup history and user settings.
//!
//! - [`HistoryStore`] keeps the 100 most recent lookups, newest first
//! - [`SettingsStore`] keeps a small key/value map of user settings
//! - [`SlotStorage`] is the persistence port both stores write through;
//!   [`FileSlotStorage`] and [`MemorySlotStorage`] implement it
//!
//! Neither store ever returns an error to the caller. History is a
//! convenience, so failures are logged and reported as `false` or as an
//! empty result.

pub mod errors;
pub mod history;
pub mod notify;
pub mod settings;
pub mod storage;

pub use errors::{Result, StorageError};
pub use history::{HistoryEntry, HistoryFilter, HistoryStore, DEFAULT_CAPACITY, HISTORY_SLOT};
pub use notify::{ClearNotifier, NoopNotifier};
pub use settings::{SettingsStore, SETTINGS_SLOT};
pub use storage::{FileSlotStorage, MemorySlotStorage, SlotStorage};
