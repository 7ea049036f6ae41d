use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use parking_lot::Mutex;
use tracing::error;

use crate::borrowers::Borrower;
use crate::config::LedgerConfig;
use crate::errors::Result;
use crate::locks::AccountLocks;
use crate::payments::Payment;
use crate::storage::Storage;

/// shared handles every ledger component works through
///
/// Each read or read-modify-write of a collection holds that collection's
/// lock for the whole cycle. When both are needed the borrower lock is
/// taken first.
pub struct LedgerContext {
    storage: Box<dyn Storage>,
    clock: SafeTimeProvider,
    config: LedgerConfig,
    accounts: AccountLocks,
    borrowers_lock: Mutex<()>,
    payments_lock: Mutex<()>,
}

impl LedgerContext {
    pub fn new(storage: Box<dyn Storage>, clock: SafeTimeProvider, config: LedgerConfig) -> Self {
        Self {
            storage,
            clock,
            config,
            accounts: AccountLocks::new(),
            borrowers_lock: Mutex::new(()),
            payments_lock: Mutex::new(()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> &SafeTimeProvider {
        &self.clock
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn accounts(&self) -> &AccountLocks {
        &self.accounts
    }

    pub fn load_borrowers(&self) -> Result<Vec<Borrower>> {
        let _guard = self.borrowers_lock.lock();
        Ok(self.storage.load_borrowers()?)
    }

    pub fn load_payments(&self) -> Result<Vec<Payment>> {
        let _guard = self.payments_lock.lock();
        Ok(self.storage.load_payments()?)
    }

    /// load, edit and save the borrower collection as one step
    ///
    /// Nothing is written when `edit` fails.
    pub fn modify_borrowers<T>(&self, edit: impl FnOnce(&mut Vec<Borrower>) -> Result<T>) -> Result<T> {
        let _guard = self.borrowers_lock.lock();
        let mut borrowers = self.storage.load_borrowers()?;
        let out = edit(&mut borrowers)?;
        self.storage.save_borrowers(&borrowers)?;
        Ok(out)
    }

    /// load, edit and save the payment collection as one step
    pub fn modify_payments<T>(&self, edit: impl FnOnce(&mut Vec<Payment>) -> Result<T>) -> Result<T> {
        let _guard = self.payments_lock.lock();
        let mut payments = self.storage.load_payments()?;
        let out = edit(&mut payments)?;
        self.storage.save_payments(&payments)?;
        Ok(out)
    }

    /// load, edit and save both collections while holding both locks
    ///
    /// Payments are saved first. If the borrower save then fails the
    /// previous payments are written back before the error is returned.
    pub fn modify_all<T>(
        &self,
        edit: impl FnOnce(&mut Vec<Borrower>, &mut Vec<Payment>) -> Result<T>,
    ) -> Result<T> {
        let _borrowers_guard = self.borrowers_lock.lock();
        let _payments_guard = self.payments_lock.lock();
        let mut borrowers = self.storage.load_borrowers()?;
        let mut payments = self.storage.load_payments()?;
        let previous_payments = payments.clone();

        let out = edit(&mut borrowers, &mut payments)?;
        self.storage.save_payments(&payments)?;
        if let Err(e) = self.storage.save_borrowers(&borrowers) {
            if let Err(restore_err) = self.storage.save_payments(&previous_payments) {
                error!(error = %restore_err, "could not restore payments after failed borrower write");
            }
            return Err(e.into());
        }
        Ok(out)
    }

    /// replace both collections, payments first
    pub fn replace_all(&self, borrowers: &[Borrower], payments: &[Payment]) -> Result<()> {
        self.modify_all(|current_borrowers, current_payments| {
            *current_borrowers = borrowers.to_vec();
            *current_payments = payments.to_vec();
            Ok(())
        })
    }
}
