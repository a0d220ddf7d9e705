//! Bounded lookup history.
//!
//! Entries are kept newest first in a single slot. After every save the
//! sequence is cut back to the store's capacity, dropping the oldest
//! entries.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use log::{debug, error, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, StorageError};
use crate::notify::{ClearNotifier, NoopNotifier};
use crate::storage::SlotStorage;

/// Slot holding the serialized history.
pub const HISTORY_SLOT: &str = "queryHistory";

/// Maximum number of retained entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// One recorded lookup.
///
/// Fields beyond the known ones are kept as-is in `extra` and written back
/// alongside them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Assigned by the store when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub batch_code: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Epoch milliseconds; assigned by the store when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_time: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl HistoryEntry {
    pub fn new(batch_code: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: None,
            batch_code: batch_code.into(),
            status: status.into(),
            product_name: None,
            query_time: None,
            extra: Map::new(),
        }
    }

    pub fn with_product_name(mut self, product_name: Option<String>) -> Self {
        self.product_name = product_name;
        self
    }

    /// Attach a caller-defined field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Which entries [`HistoryStore::get_all`] returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    /// Entries whose status equals this value exactly
    Status(String),
}

impl HistoryFilter {
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Status(value.to_string())
        }
    }

    fn accepts(&self, entry: &HistoryEntry) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => entry.status == *status,
        }
    }
}

/// Bounded, newest-first lookup history.
pub struct HistoryStore {
    storage: Arc<dyn SlotStorage>,
    notifier: Arc<dyn ClearNotifier>,
    capacity: usize,
    /// Serializes read-modify-write cycles on the slot
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self {
            storage,
            notifier: Arc::new(NoopNotifier),
            capacity: DEFAULT_CAPACITY,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ClearNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Override the retained entry count. A capacity of zero is raised to one.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| {
            warn!("History write lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Read the slot. Entries that fail to decode are skipped so one bad
    /// entry never hides, or on the next save destroys, the rest.
    fn load(&self) -> Result<Vec<HistoryEntry>> {
        let Some(contents) = self.storage.read(HISTORY_SLOT)? else {
            return Ok(Vec::new());
        };

        let raw: Vec<Value> = serde_json::from_str(&contents)?;
        let entries = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable history entry at {}: {}", index, e);
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    /// Record a lookup.
    ///
    /// Assigns `id` and `query_time` when absent, puts the entry first and
    /// drops whatever falls past the capacity. Returns `false` when the
    /// history could not be persisted.
    pub fn save(&self, entry: HistoryEntry) -> bool {
        let _guard = self.lock_writes();
        match self.try_save(entry) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save history entry: {}", e);
                false
            }
        }
    }

    fn try_save(&self, mut entry: HistoryEntry) -> Result<()> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(e)) => {
                warn!("Discarding unreadable history: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let now = Utc::now().timestamp_millis();
        if entry.query_time.is_none() {
            entry.query_time = Some(now);
        }
        if entry.id.is_none() {
            entry.id = Some(next_id(&entries, now));
        }

        debug!(
            "Saving history entry {:?} for '{}'",
            entry.id, entry.batch_code
        );
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        let contents = serde_json::to_string(&entries)?;
        self.storage.write(HISTORY_SLOT, &contents)
    }

    /// Entries matching `filter` (`"all"` or a status value), newest first.
    ///
    /// An unknown status simply matches nothing. Read failures yield an
    /// empty list.
    pub fn get_all(&self, filter: &str) -> Vec<HistoryEntry> {
        self.get_filtered(&HistoryFilter::parse(filter))
    }

    pub fn get_filtered(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        match self.load() {
            Ok(entries) => match filter {
                HistoryFilter::All => entries,
                _ => entries.into_iter().filter(|e| filter.accepts(e)).collect(),
            },
            Err(e) => {
                error!("Failed to read history: {}", e);
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.get_filtered(&HistoryFilter::All).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    ///
    /// The notifier fires only after a successful clear. On failure the
    /// stored entries are left untouched and `false` is returned.
    pub fn clear(&self) -> bool {
        let _guard = self.lock_writes();
        match self.storage.remove(HISTORY_SLOT) {
            Ok(()) => {
                self.notifier.history_cleared();
                true
            }
            Err(e) => {
                error!("Failed to clear history: {}", e);
                false
            }
        }
    }
}

/// Millisecond-timestamp id, bumped past any id already in use.
fn next_id(entries: &[HistoryEntry], now_ms: i64) -> String {
    let mut candidate = now_ms;
    loop {
        let id = candidate.to_string();
        if !entries.iter().any(|e| e.id.as_deref() == Some(id.as_str())) {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlotStorage;

    fn store() -> HistoryStore {
        HistoryStore::new(Arc::new(MemorySlotStorage::new()))
    }

    #[test]
    fn test_save_assigns_id_and_time() {
        let store = store();
        assert!(store.save(HistoryEntry::new("AB12", "recalled")));

        let entries = store.get_all("all");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.is_some());
        assert!(entries[0].query_time.is_some());
    }

    #[test]
    fn test_save_keeps_caller_id_and_time() {
        let store = store();
        let mut entry = HistoryEntry::new("AB12", "recalled");
        entry.id = Some("custom".to_string());
        entry.query_time = Some(42);
        store.save(entry);

        let entries = store.get_all("all");
        assert_eq!(entries[0].id.as_deref(), Some("custom"));
        assert_eq!(entries[0].query_time, Some(42));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let store = store();
        for i in 0..20 {
            store.save(HistoryEntry::new(format!("CODE{}", i), "not_recalled"));
        }
        let mut ids: Vec<String> = store
            .get_all("all")
            .into_iter()
            .filter_map(|e| e.id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_next_id_skips_taken() {
        let mut taken = HistoryEntry::new("A", "recalled");
        taken.id = Some("1000".to_string());
        let mut taken_next = HistoryEntry::new("B", "recalled");
        taken_next.id = Some("1001".to_string());

        assert_eq!(next_id(&[taken, taken_next], 1000), "1002");
        assert_eq!(next_id(&[], 1000), "1000");
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let store = store();
        store.save(
            HistoryEntry::new("AB12", "recalled")
                .with_product_name(Some("SMA".to_string()))
                .with_field("brand", "Nestlé")
                .with_field("backend", "secondary"),
        );

        let entry = &store.get_all("all")[0];
        assert_eq!(entry.product_name.as_deref(), Some("SMA"));
        assert_eq!(entry.extra["brand"], "Nestlé");
        assert_eq!(entry.extra["backend"], "secondary");
    }

    #[test]
    fn test_null_status_decodes_as_empty() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"batchCode":"AB12","status":null}"#).unwrap();
        assert_eq!(entry.status, "");
        assert!(entry.extra.is_empty());
    }

    #[test]
    fn test_undecodable_entry_is_skipped() {
        let storage = Arc::new(MemorySlotStorage::new());
        storage
            .write(
                HISTORY_SLOT,
                r#"[{"batchCode":"AB12","status":"recalled"},{"status":"recalled"},{"batchCode":"CD34","status":"expired"}]"#,
            )
            .unwrap();
        let store = HistoryStore::new(storage);

        let codes: Vec<String> = store
            .get_all("all")
            .into_iter()
            .map(|e| e.batch_code)
            .collect();
        assert_eq!(codes, vec!["AB12", "CD34"]);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(HistoryFilter::parse("all"), HistoryFilter::All);
        assert_eq!(
            HistoryFilter::parse("recalled"),
            HistoryFilter::Status("recalled".to_string())
        );
    }
}
