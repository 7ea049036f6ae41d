use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Storage, StorageError, StorageResult};
use crate::borrowers::Borrower;
use crate::payments::Payment;
use crate::types::EntityKind;

/// one json document per entity kind inside a directory
///
/// Files are named after the collection keys (`money_lending_borrowers.json`,
/// `money_lending_payments.json`). A missing file reads as an empty
/// collection. Writes go to a sibling temp file which is then renamed over
/// the target.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            kind: EntityKind::Borrowers,
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.storage_key()))
    }

    fn read<T: DeserializeOwned>(&self, kind: EntityKind) -> StorageResult<Vec<T>> {
        let path = self.path_for(kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StorageError::Io { kind, source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Serialization { kind, source })
    }

    fn write<T: Serialize>(&self, kind: EntityKind, records: &[T]) -> StorageResult<()> {
        let path = self.path_for(kind);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(records)
            .map_err(|source| StorageError::Serialization { kind, source })?;
        fs::write(&tmp, json).map_err(|source| StorageError::Io { kind, source })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { kind, source })?;
        debug!(kind = %kind, records = records.len(), path = %path.display(), "collection written");
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load_borrowers(&self) -> StorageResult<Vec<Borrower>> {
        self.read(EntityKind::Borrowers)
    }

    fn save_borrowers(&self, borrowers: &[Borrower]) -> StorageResult<()> {
        self.write(EntityKind::Borrowers, borrowers)
    }

    fn load_payments(&self) -> StorageResult<Vec<Payment>> {
        self.read(EntityKind::Payments)
    }

    fn save_payments(&self, payments: &[Payment]) -> StorageResult<()> {
        self.write(EntityKind::Payments, payments)
    }
}
