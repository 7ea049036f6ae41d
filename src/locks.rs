use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;

use crate::types::AccountNumber;

/// per-account mutual exclusion
///
/// Mutations touching the same account run one at a time; different
/// accounts never wait on each other. Not reentrant.
#[derive(Debug, Default)]
pub struct AccountLocks {
    held: Mutex<HashSet<AccountNumber>>,
    released: Condvar,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// block until `account` is free, then hold it until the guard drops
    pub fn lock(&self, account: &AccountNumber) -> AccountGuard<'_> {
        let mut held = self.held.lock();
        while held.contains(account) {
            self.released.wait(&mut held);
        }
        held.insert(account.clone());
        AccountGuard {
            locks: self,
            account: account.clone(),
        }
    }

    pub fn is_locked(&self, account: &AccountNumber) -> bool {
        self.held.lock().contains(account)
    }
}

pub struct AccountGuard<'a> {
    locks: &'a AccountLocks,
    account: AccountNumber,
}

impl AccountGuard<'_> {
    pub fn account(&self) -> &AccountNumber {
        &self.account
    }
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.account);
        self.locks.released.notify_all();
    }
}
