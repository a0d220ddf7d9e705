//! User settings persisted next to the history.

use std::sync::{Arc, Mutex, MutexGuard};

use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::storage::SlotStorage;

/// Slot holding the serialized settings map.
pub const SETTINGS_SLOT: &str = "settings";

/// Best-effort key/value settings.
pub struct SettingsStore {
    storage: Arc<dyn SlotStorage>,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> Result<Map<String, Value>> {
        match self.storage.read(SETTINGS_SLOT)? {
            Some(contents) => Ok(serde_json::from_str(&contents)?),
            None => Ok(Map::new()),
        }
    }

    /// Read a setting, falling back to `default` when it is missing,
    /// has another type, or cannot be read.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let settings = match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to read settings: {}", e);
                return default;
            }
        };

        settings
            .get(key)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(default)
    }

    /// Store a setting. Returns `false` when it could not be persisted.
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> bool {
        let _guard = self.lock_writes();
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save setting '{}': {}", key, e);
                false
            }
        }
    }

    fn try_set<T: Serialize>(&self, key: &str, value: T) -> Result<()> {
        let mut settings = self.load()?;
        settings.insert(key.to_string(), serde_json::to_value(value)?);
        self.storage
            .write(SETTINGS_SLOT, &serde_json::to_string(&settings)?)
    }

    /// All settings as a JSON object.
    pub fn all(&self) -> Map<String, Value> {
        self.load().unwrap_or_else(|e| {
            error!("Failed to read settings: {}", e);
            Map::new()
        })
    }
}
