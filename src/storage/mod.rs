pub mod json_file;
pub mod memory;

use thiserror::Error;

use crate::borrowers::Borrower;
use crate::payments::Payment;
use crate::types::EntityKind;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{kind}: io error: {source}")]
    Io {
        kind: EntityKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind}: malformed records: {source}")]
    Serialization {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind}: backend unavailable: {message}")]
    Unavailable {
        kind: EntityKind,
        message: String,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// whole-collection persistence for the two ledger entity kinds
///
/// The ledger performs read-modify-write cycles against this trait and
/// serializes them per kind, so implementations only need each individual
/// call to be atomic.
pub trait Storage: Send + Sync {
    fn load_borrowers(&self) -> StorageResult<Vec<Borrower>>;

    fn save_borrowers(&self, borrowers: &[Borrower]) -> StorageResult<()>;

    fn load_payments(&self) -> StorageResult<Vec<Payment>>;

    fn save_payments(&self, payments: &[Payment]) -> StorageResult<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn load_borrowers(&self) -> StorageResult<Vec<Borrower>> {
        (**self).load_borrowers()
    }

    fn save_borrowers(&self, borrowers: &[Borrower]) -> StorageResult<()> {
        (**self).save_borrowers(borrowers)
    }

    fn load_payments(&self) -> StorageResult<Vec<Payment>> {
        (**self).load_payments()
    }

    fn save_payments(&self, payments: &[Payment]) -> StorageResult<()> {
        (**self).save_payments(payments)
    }
}
