use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use super::{validate_slot, SlotStorage};
use crate::errors::Result;

/// Slot storage backed by one JSON file per slot in a directory.
///
/// Writes go to a temporary file that is then renamed over the slot file,
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf> {
        validate_slot(slot)?;
        Ok(self.dir.join(format!("{}.json", slot)))
    }
}

impl SlotStorage for FileSlotStorage {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: &str, contents: &str) -> Result<()> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote slot '{}' to {}", slot, path.display());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_remove() {
        let dir = tempdir().unwrap();
        let storage = FileSlotStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read("queryHistory").unwrap(), None);

        storage.write("queryHistory", "[1,2]").unwrap();
        assert_eq!(storage.read("queryHistory").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("nested/queryHistory.json").exists());
        assert!(!dir.path().join("nested/queryHistory.json.tmp").exists());

        storage.write("queryHistory", "[]").unwrap();
        assert_eq!(storage.read("queryHistory").unwrap().as_deref(), Some("[]"));

        storage.remove("queryHistory").unwrap();
        assert_eq!(storage.read("queryHistory").unwrap(), None);
        storage.remove("queryHistory").unwrap();
    }

    #[test]
    fn test_rejects_path_like_slots() {
        let dir = tempdir().unwrap();
        let storage = FileSlotStorage::new(dir.path());

        assert!(matches!(
            storage.write("../escape", "x"),
            Err(StorageError::InvalidSlot(_))
        ));
    }
}
