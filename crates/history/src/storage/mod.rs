//! Slot storage port.
//!
//! A slot is a named cell holding one serialized JSON document. The history
//! lives in one slot and the settings in another.

mod file;
mod memory;

pub use file::FileSlotStorage;
pub use memory::MemorySlotStorage;

use crate::errors::{Result, StorageError};

/// Named-slot persistence primitive.
pub trait SlotStorage: Send + Sync {
    /// Read a slot. `Ok(None)` means the slot has never been written or was removed.
    fn read(&self, slot: &str) -> Result<Option<String>>;

    /// Replace a slot's contents.
    fn write(&self, slot: &str, contents: &str) -> Result<()>;

    /// Remove a slot. Removing a missing slot succeeds.
    fn remove(&self, slot: &str) -> Result<()>;
}

/// Slot names map to file names, so keep them to a safe alphabet.
pub(crate) fn validate_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidSlot(slot.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slot() {
        assert!(validate_slot("queryHistory").is_ok());
        assert!(validate_slot("settings_v2-beta").is_ok());
        assert!(validate_slot("").is_err());
        assert!(validate_slot("../etc/passwd").is_err());
        assert!(validate_slot("a b").is_err());
    }
}
