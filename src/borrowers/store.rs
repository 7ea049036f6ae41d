use std::collections::HashSet;
use tracing::{info, instrument};

use super::{AccountNumberGenerator, Borrower, BorrowerUpdate, NewBorrower};
use crate::context::LedgerContext;
use crate::errors::{LedgerError, Result};
use crate::payments::store::delete_all_for_account;
use crate::types::AccountNumber;

/// owns the borrower collection
pub struct BorrowerStore<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> BorrowerStore<'a> {
    pub(crate) fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// register a borrower under a freshly drawn account number
    #[instrument(skip_all, fields(name = %new.name))]
    pub(crate) fn create(&self, new: NewBorrower) -> Result<Borrower> {
        new.validate()?;
        let now = self.ctx.now();
        let generator = AccountNumberGenerator::new(&self.ctx.config().account_numbers);

        let borrower = self.ctx.modify_borrowers(|borrowers| {
            let existing: HashSet<AccountNumber> =
                borrowers.iter().map(|b| b.account_number.clone()).collect();
            let account_number = generator.generate(&existing, &mut rand::rng())?;
            let borrower = new.into_borrower(account_number, now);
            borrowers.push(borrower.clone());
            Ok(borrower)
        })?;

        info!(account_number = %borrower.account_number, "borrower registered");
        Ok(borrower)
    }

    pub fn get(&self, account_number: &AccountNumber) -> Result<Borrower> {
        self.ctx
            .load_borrowers()?
            .into_iter()
            .find(|b| &b.account_number == account_number)
            .ok_or_else(|| LedgerError::BorrowerNotFound {
                account_number: account_number.clone(),
            })
    }

    /// all borrowers, most recently registered first
    pub fn list(&self) -> Result<Vec<Borrower>> {
        let mut borrowers = self.ctx.load_borrowers()?;
        sort_by_created_desc(&mut borrowers);
        Ok(borrowers)
    }

    /// borrowers matching `query` on name, city, account number or phone
    pub fn search(&self, query: &str) -> Result<Vec<Borrower>> {
        let mut matches: Vec<Borrower> = self
            .ctx
            .load_borrowers()?
            .into_iter()
            .filter(|b| b.matches(query))
            .collect();
        sort_by_created_desc(&mut matches);
        Ok(matches)
    }

    #[instrument(skip_all, fields(account_number = %account_number))]
    pub(crate) fn update(&self, account_number: &AccountNumber, update: BorrowerUpdate) -> Result<Borrower> {
        update.validate()?;
        let now = self.ctx.now();
        let borrower = self.ctx.modify_borrowers(|borrowers| {
            let borrower = borrowers
                .iter_mut()
                .find(|b| &b.account_number == account_number)
                .ok_or_else(|| LedgerError::BorrowerNotFound {
                    account_number: account_number.clone(),
                })?;
            borrower.apply(update, now);
            // nothing is saved when the new terms overflow
            borrower.monthly_interest()?;
            Ok(borrower.clone())
        })?;

        info!("borrower updated");
        Ok(borrower)
    }

    /// remove a borrower and every payment it owns; `false` when absent
    ///
    /// Both collections are rewritten under their locks, so no reader sees
    /// the payments of a borrower that is already gone.
    #[instrument(skip_all, fields(account_number = %account_number))]
    pub(crate) fn delete(&self, account_number: &AccountNumber) -> Result<bool> {
        let removed = self.ctx.modify_all(|borrowers, payments| {
            let Some(index) = borrowers.iter().position(|b| &b.account_number == account_number) else {
                return Ok(None);
            };
            borrowers.remove(index);
            Ok(Some(delete_all_for_account(payments, account_number)))
        })?;

        match removed {
            Some(payments) => {
                info!(payments, "borrower deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// account numbers currently in use
    pub fn account_numbers(&self) -> Result<HashSet<AccountNumber>> {
        Ok(self
            .ctx
            .load_borrowers()?
            .into_iter()
            .map(|b| b.account_number)
            .collect())
    }
}

/// newest registration first; ties keep the most recently inserted first
pub(crate) fn sort_by_created_desc(borrowers: &mut Vec<Borrower>) {
    borrowers.reverse();
    borrowers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
