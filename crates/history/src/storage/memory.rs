use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{validate_slot, SlotStorage};
use crate::errors::Result;

/// In-process slot storage. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        Ok(self.lock_slots().get(slot).cloned())
    }

    fn write(&self, slot: &str, contents: &str) -> Result<()> {
        validate_slot(slot)?;
        self.lock_slots()
            .insert(slot.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        validate_slot(slot)?;
        self.lock_slots().remove(slot);
        Ok(())
    }
}
