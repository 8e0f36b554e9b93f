//! File-backed session: one file per slot under a directory.
//!
//! Used by the `cart` tool so a cart survives between invocations.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::adapter::PersistenceAdapter;
use crate::error::{PersistenceError, PersistenceResult};

const SLOT_EXTENSION: &str = "slot";

/// Slots stored as `<dir>/<slot>.slot`.
#[derive(Debug, Clone)]
pub struct FileSession {
    dir: PathBuf,
}

impl FileSession {
    /// Opens (and creates if needed) the session directory.
    pub fn open(dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileSession { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PersistenceResult<PathBuf> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
        if !valid {
            return Err(PersistenceError::InvalidSlot {
                slot: slot.to_string(),
                reason: "only letters, digits, '_' and '-' are allowed".to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.{}", slot, SLOT_EXTENSION)))
    }
}

impl PersistenceAdapter for FileSession {
    fn read_raw(&self, slot: &str) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)?) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_raw(&mut self, slot: &str, payload: &str) -> PersistenceResult<()> {
        let path = self.slot_path(slot)?;
        // Readers see either the old slot or the new one
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete_raw(&mut self, slot: &str) -> PersistenceResult<()> {
        match fs::remove_file(self.slot_path(slot)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
