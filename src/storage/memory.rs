use parking_lot::RwLock;

use super::{Storage, StorageResult};
use crate::borrowers::Borrower;
use crate::payments::Payment;

/// in-process storage, the default backend for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStorage {
    borrowers: RwLock<Vec<Borrower>>,
    payments: RwLock<Vec<Payment>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_borrowers(&self) -> StorageResult<Vec<Borrower>> {
        Ok(self.borrowers.read().clone())
    }

    fn save_borrowers(&self, borrowers: &[Borrower]) -> StorageResult<()> {
        *self.borrowers.write() = borrowers.to_vec();
        Ok(())
    }

    fn load_payments(&self) -> StorageResult<Vec<Payment>> {
        Ok(self.payments.read().clone())
    }

    fn save_payments(&self, payments: &[Payment]) -> StorageResult<()> {
        *self.payments.write() = payments.to_vec();
        Ok(())
    }
}
