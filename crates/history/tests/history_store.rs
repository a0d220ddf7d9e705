use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use recallcheck_history::{
    ClearNotifier, FileSlotStorage, HistoryEntry, HistoryStore, MemorySlotStorage, SlotStorage,
    StorageError, DEFAULT_CAPACITY, HISTORY_SLOT,
};

/// Memory storage whose operations can be made to fail on demand.
#[derive(Default)]
struct FlakyStorage {
    inner: MemorySlotStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
}

fn unavailable() -> StorageError {
    StorageError::Unavailable("storage offline".to_string())
}

impl SlotStorage for FlakyStorage {
    fn read(&self, slot: &str) -> recallcheck_history::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.read(slot)
    }

    fn write(&self, slot: &str, contents: &str) -> recallcheck_history::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.write(slot, contents)
    }

    fn remove(&self, slot: &str) -> recallcheck_history::Result<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.remove(slot)
    }
}

#[derive(Default)]
struct CountingNotifier {
    cleared: AtomicUsize,
}

impl ClearNotifier for CountingNotifier {
    fn history_cleared(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

fn memory_store() -> HistoryStore {
    HistoryStore::new(Arc::new(MemorySlotStorage::new()))
}

#[test]
fn evicts_oldest_past_capacity() {
    let store = memory_store();
    for i in 0..=DEFAULT_CAPACITY {
        assert!(store.save(HistoryEntry::new(format!("CODE{:03}", i), "not_recalled")));
    }

    let entries = store.get_all("all");
    assert_eq!(entries.len(), DEFAULT_CAPACITY);
    assert_eq!(entries[0].batch_code, "CODE100");
    assert_eq!(entries[DEFAULT_CAPACITY - 1].batch_code, "CODE001");
    assert!(entries.iter().all(|e| e.batch_code != "CODE000"));
}

#[test]
fn custom_capacity_is_respected() {
    let store = memory_store().with_capacity(3);
    for code in ["A1", "B2", "C3", "D4", "E5"] {
        store.save(HistoryEntry::new(code, "recalled"));
    }

    let codes: Vec<String> = store
        .get_all("all")
        .into_iter()
        .map(|e| e.batch_code)
        .collect();
    assert_eq!(codes, vec!["E5", "D4", "C3"]);
}

#[test]
fn returns_newest_first_and_filters_by_status() {
    let store = memory_store();
    store.save(HistoryEntry::new("AB1", "recalled"));
    store.save(HistoryEntry::new("AB2", "not_recalled"));
    store.save(HistoryEntry::new("AB3", "recalled"));

    let all: Vec<String> = store
        .get_all("all")
        .into_iter()
        .map(|e| e.batch_code)
        .collect();
    assert_eq!(all, vec!["AB3", "AB2", "AB1"]);

    let recalled: Vec<String> = store
        .get_all("recalled")
        .into_iter()
        .map(|e| e.batch_code)
        .collect();
    assert_eq!(recalled, vec!["AB3", "AB1"]);

    assert!(store.get_all("nonexistent").is_empty());
}

#[test]
fn empty_store_returns_empty_list() {
    let store = memory_store();
    assert!(store.get_all("all").is_empty());
    assert!(store.is_empty());
}

#[test]
fn clear_notifies_once_on_success() {
    let notifier = Arc::new(CountingNotifier::default());
    let store = memory_store().with_notifier(notifier.clone());
    store.save(HistoryEntry::new("AB1", "recalled"));

    assert!(store.clear());
    assert!(store.get_all("all").is_empty());
    assert_eq!(notifier.cleared.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_clear_keeps_entries_and_skips_notification() {
    let storage = Arc::new(FlakyStorage::default());
    let notifier = Arc::new(CountingNotifier::default());
    let store = HistoryStore::new(storage.clone()).with_notifier(notifier.clone());
    store.save(HistoryEntry::new("AB1", "recalled"));
    store.save(HistoryEntry::new("AB2", "not_recalled"));

    storage.fail_removes.store(true, Ordering::SeqCst);
    assert!(!store.clear());

    assert_eq!(store.get_all("all").len(), 2);
    assert_eq!(notifier.cleared.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_save_returns_false_and_keeps_previous() {
    let storage = Arc::new(FlakyStorage::default());
    let store = HistoryStore::new(storage.clone());
    assert!(store.save(HistoryEntry::new("AB1", "recalled")));

    storage.fail_writes.store(true, Ordering::SeqCst);
    assert!(!store.save(HistoryEntry::new("AB2", "recalled")));

    storage.fail_writes.store(false, Ordering::SeqCst);
    let entries = store.get_all("all");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].batch_code, "AB1");
}

#[test]
fn read_failure_yields_empty_list_and_failed_save() {
    let storage = Arc::new(FlakyStorage::default());
    let store = HistoryStore::new(storage.clone());
    store.save(HistoryEntry::new("AB1", "recalled"));

    storage.fail_reads.store(true, Ordering::SeqCst);
    assert!(store.get_all("all").is_empty());
    assert!(!store.save(HistoryEntry::new("AB2", "recalled")));

    storage.fail_reads.store(false, Ordering::SeqCst);
    assert_eq!(store.get_all("all").len(), 1);
}

#[test]
fn corrupt_slot_reads_empty_and_is_replaced_on_save() {
    let storage = Arc::new(MemorySlotStorage::new());
    storage.write(HISTORY_SLOT, "not json at all").unwrap();
    let store = HistoryStore::new(storage.clone());

    assert!(store.get_all("all").is_empty());
    assert!(store.save(HistoryEntry::new("AB1", "recalled")));
    assert_eq!(store.get_all("all").len(), 1);
}

#[test]
fn file_backed_history_survives_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = HistoryStore::new(Arc::new(FileSlotStorage::new(dir.path())));
        store.save(
            HistoryEntry::new("AB123F1", "recalled")
                .with_product_name(Some("SMA Advanced First Infant Milk".to_string()))
                .with_field("backend", "primary"),
        );
    }

    let store = HistoryStore::new(Arc::new(FileSlotStorage::new(dir.path())));
    let entries = store.get_all("recalled");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].batch_code, "AB123F1");
    assert_eq!(entries[0].extra["backend"], "primary");

    let raw = std::fs::read_to_string(dir.path().join("queryHistory.json")).unwrap();
    assert!(raw.contains("\"batchCode\":\"AB123F1\""));
    assert!(raw.contains("\"queryTime\":"));
}

#[test]
fn bad_entry_does_not_cost_the_valid_ones() {
    let storage = Arc::new(MemorySlotStorage::new());
    let mut slot: Vec<serde_json::Value> = (1..=5)
        .map(|i| serde_json::json!({"id": i.to_string(), "batchCode": format!("OK{}", i), "status": "recalled"}))
        .collect();
    slot.push(serde_json::json!({"batchCode": "NULLSTATUS", "status": null}));
    slot.push(serde_json::json!({"status": "recalled"}));
    storage
        .write(HISTORY_SLOT, &serde_json::to_string(&slot).unwrap())
        .unwrap();
    let store = HistoryStore::new(storage);

    assert_eq!(store.get_all("all").len(), 6);
    assert_eq!(store.get_all("recalled").len(), 5);

    assert!(store.save(HistoryEntry::new("NEW1", "not_recalled")));
    let codes: Vec<String> = store
        .get_all("all")
        .into_iter()
        .map(|e| e.batch_code)
        .collect();
    assert_eq!(
        codes,
        vec!["NEW1", "OK1", "OK2", "OK3", "OK4", "OK5", "NULLSTATUS"]
    );
}

#[test]
fn overlapping_saves_stay_bounded_with_unique_ids() {
    const THREADS: usize = 8;
    const SAVES_PER_THREAD: usize = 20;

    let store = Arc::new(memory_store());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..SAVES_PER_THREAD {
                    assert!(store.save(HistoryEntry::new(format!("T{}N{}", t, i), "recalled")));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = store.get_all("all");
    assert_eq!(entries.len(), (THREADS * SAVES_PER_THREAD).min(DEFAULT_CAPACITY));

    let ids: HashSet<String> = entries.iter().filter_map(|e| e.id.clone()).collect();
    assert_eq!(ids.len(), entries.len());
}

#[test]
fn overlapping_saves_below_capacity_lose_nothing() {
    let store = Arc::new(memory_store());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..10 {
                    store.save(HistoryEntry::new(format!("T{}N{}", t, i), "recalled"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let codes: HashSet<String> = store
        .get_all("all")
        .into_iter()
        .map(|e| e.batch_code)
        .collect();
    assert_eq!(codes.len(), 40);
}
