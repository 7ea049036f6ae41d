use std::collections::HashSet;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::{sort_by_payment_date_desc, InterestAggregator, NewPayment, Payment, PaymentUpdate};
use crate::context::LedgerContext;
use crate::errors::{LedgerError, Result};
use crate::types::{AccountNumber, PaymentId};

/// owns the payment collection
///
/// Every mutation that changes an account's payments finishes by running the
/// interest aggregator for that account. If the recompute fails the payment
/// change is reverted before the error is returned.
pub struct PaymentStore<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> PaymentStore<'a> {
    pub(crate) fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip_all, fields(account_number = %new.account_number))]
    pub(crate) fn create(&self, new: NewPayment) -> Result<Payment> {
        new.validate()?;
        let exists = self
            .ctx
            .load_borrowers()?
            .iter()
            .any(|b| b.account_number == new.account_number);
        if !exists {
            return Err(LedgerError::BorrowerNotFound {
                account_number: new.account_number,
            });
        }

        let now = self.ctx.now();
        let payment = self.ctx.modify_payments(|payments| {
            let taken: HashSet<PaymentId> = payments.iter().map(|p| p.id).collect();
            let mut id = Uuid::new_v4();
            while taken.contains(&id) {
                id = Uuid::new_v4();
            }
            let payment = Payment {
                id,
                account_number: new.account_number.clone(),
                payment_amount: new.payment_amount,
                payment_month: new.payment_month,
                payment_date: now,
                created_at: now,
                updated_at: now,
            };
            payments.push(payment.clone());
            Ok(payment)
        })?;

        if let Err(e) = self.settle(&payment.account_number) {
            self.revert(&payment.account_number, |payments| {
                payments.retain(|p| p.id != payment.id);
            });
            return Err(e);
        }

        info!(payment_id = %payment.id, amount = %payment.payment_amount, month = %payment.payment_month, "payment recorded");
        Ok(payment)
    }

    pub fn get(&self, id: PaymentId) -> Result<Payment> {
        self.ctx
            .load_payments()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(LedgerError::PaymentNotFound { id })
    }

    /// payments for one account, newest first
    pub fn get_by_account(&self, account_number: &AccountNumber) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .ctx
            .load_payments()?
            .into_iter()
            .filter(|p| &p.account_number == account_number)
            .collect();
        sort_by_payment_date_desc(&mut payments);
        Ok(payments)
    }

    /// every payment, newest first
    pub fn list(&self) -> Result<Vec<Payment>> {
        let mut payments = self.ctx.load_payments()?;
        sort_by_payment_date_desc(&mut payments);
        Ok(payments)
    }

    #[instrument(skip_all, fields(payment_id = %id))]
    pub(crate) fn update(&self, id: PaymentId, update: PaymentUpdate) -> Result<Payment> {
        update.validate()?;
        let now = self.ctx.now();

        let (before, after) = self.ctx.modify_payments(|payments| {
            let payment = payments
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(LedgerError::PaymentNotFound { id })?;
            let before = payment.clone();
            payment.apply(update, now);
            Ok((before, payment.clone()))
        })?;

        if let Err(e) = self.settle(&after.account_number) {
            self.revert(&after.account_number, |payments| {
                if let Some(p) = payments.iter_mut().find(|p| p.id == id) {
                    *p = before;
                }
            });
            return Err(e);
        }

        info!(account_number = %after.account_number, amount = %after.payment_amount, "payment updated");
        Ok(after)
    }

    /// remove a payment; `false` when no such payment exists
    #[instrument(skip_all, fields(payment_id = %id))]
    pub(crate) fn delete(&self, id: PaymentId) -> Result<bool> {
        let removed = self.ctx.modify_payments(|payments| {
            Ok(payments
                .iter()
                .position(|p| p.id == id)
                .map(|index| (index, payments.remove(index))))
        })?;

        let Some((index, payment)) = removed else {
            debug!("payment not found");
            return Ok(false);
        };

        let account_number = payment.account_number.clone();
        if let Err(e) = self.settle(&account_number) {
            self.revert(&account_number, |payments| {
                let at = index.min(payments.len());
                payments.insert(at, payment);
            });
            return Err(e);
        }

        info!("payment deleted");
        Ok(true)
    }

    fn settle(&self, account_number: &AccountNumber) -> Result<()> {
        InterestAggregator::new(self.ctx).recompute(account_number)?;
        Ok(())
    }

    fn revert(&self, account_number: &AccountNumber, undo: impl FnOnce(&mut Vec<Payment>)) {
        let outcome = self.ctx.modify_payments(|payments| {
            undo(payments);
            Ok(())
        });
        if let Err(e) = outcome {
            error!(account_number = %account_number, error = %e, "could not revert payment change");
        }
    }
}

/// drop every payment of an account without recomputing, returning the count
///
/// Only used when the owning borrower is removed in the same write.
pub(crate) fn delete_all_for_account(payments: &mut Vec<Payment>, account_number: &AccountNumber) -> usize {
    let before = payments.len();
    payments.retain(|p| &p.account_number != account_number);
    before - payments.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrowers::NewBorrower;
    use crate::config::LedgerConfig;
    use crate::decimal::{Money, Rate};
    use crate::storage::MemoryStorage;
    use crate::types::PaymentMonth;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};

    fn context() -> LedgerContext {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        ));
        LedgerContext::new(Box::new(MemoryStorage::new()), time, LedgerConfig::default())
    }

    fn seed_borrower(ctx: &LedgerContext, account: &str) -> AccountNumber {
        let account = AccountNumber::parse(account).unwrap();
        let borrower = NewBorrower::new("Asha", "98765", "Pune", Money::from_major(10_000), Rate::from_percentage(2))
            .into_borrower(account.clone(), ctx.now());
        ctx.modify_borrowers(|b| {
            b.push(borrower);
            Ok(())
        })
        .unwrap();
        account
    }

    fn month(s: &str) -> PaymentMonth {
        PaymentMonth::parse(s).unwrap()
    }

    fn total(ctx: &LedgerContext, account: &AccountNumber) -> Money {
        ctx.load_borrowers()
            .unwrap()
            .into_iter()
            .find(|b| &b.account_number == account)
            .unwrap()
            .total_interest_paid
    }

    #[test]
    fn test_create_requires_existing_borrower() {
        let ctx = context();
        let store = PaymentStore::new(&ctx);
        let err = store
            .create(NewPayment::new(AccountNumber::parse("9999").unwrap(), Money::from_major(10), month("2024-01")))
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(ctx.load_payments().unwrap().is_empty());
    }

    #[test]
    fn test_create_stamps_and_aggregates() {
        let ctx = context();
        let account = seed_borrower(&ctx, "1234");
        let store = PaymentStore::new(&ctx);

        let p = store
            .create(NewPayment::new(account.clone(), Money::from_major(150), month("2024-01")))
            .unwrap();

        assert_eq!(p.payment_date, ctx.now());
        assert_eq!(p.created_at, p.updated_at);
        assert_eq!(total(&ctx, &account), Money::from_major(150));
        assert_eq!(store.get(p.id).unwrap(), p);
    }

    #[test]
    fn test_same_month_twice_is_allowed() {
        let ctx = context();
        let account = seed_borrower(&ctx, "1234");
        let store = PaymentStore::new(&ctx);

        store.create(NewPayment::new(account.clone(), Money::from_major(100), month("2024-03"))).unwrap();
        store.create(NewPayment::new(account.clone(), Money::from_major(100), month("2024-03"))).unwrap();

        assert_eq!(store.get_by_account(&account).unwrap().len(), 2);
        assert_eq!(total(&ctx, &account), Money::from_major(200));
    }

    #[test]
    fn test_history_is_newest_first() {
        let ctx = context();
        let account = seed_borrower(&ctx, "1234");
        let control = ctx.clock().test_control().unwrap();
        let store = PaymentStore::new(&ctx);

        let first = store.create(NewPayment::new(account.clone(), Money::from_major(1), month("2024-01"))).unwrap();
        control.advance(Duration::days(1));
        let second = store.create(NewPayment::new(account.clone(), Money::from_major(2), month("2024-02"))).unwrap();

        let history = store.get_by_account(&account).unwrap();
        assert_eq!(history.iter().map(|p| p.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    }

    #[test]
    fn test_update_and_delete_recompute() {
        let ctx = context();
        let account = seed_borrower(&ctx, "1234");
        let store = PaymentStore::new(&ctx);
        let p = store.create(NewPayment::new(account.clone(), Money::from_major(150), month("2024-01"))).unwrap();
        let q = store.create(NewPayment::new(account.clone(), Money::from_major(50), month("2024-02"))).unwrap();

        let edited = store.update(p.id, PaymentUpdate::default().amount(Money::from_major(100))).unwrap();
        assert_eq!(edited.payment_amount, Money::from_major(100));
        assert_eq!(total(&ctx, &account), Money::from_major(150));

        assert!(store.delete(q.id).unwrap());
        assert_eq!(total(&ctx, &account), Money::from_major(100));
        assert!(!store.delete(q.id).unwrap());
        assert!(store.update(q.id, PaymentUpdate::default()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_all_for_account_leaves_others() {
        let ctx = context();
        let a = seed_borrower(&ctx, "1111");
        let b = seed_borrower(&ctx, "2222");
        let store = PaymentStore::new(&ctx);
        store.create(NewPayment::new(a.clone(), Money::from_major(1), month("2024-01"))).unwrap();
        store.create(NewPayment::new(a.clone(), Money::from_major(2), month("2024-02"))).unwrap();
        store.create(NewPayment::new(b.clone(), Money::from_major(3), month("2024-01"))).unwrap();

        let removed = ctx
            .modify_payments(|payments| Ok(delete_all_for_account(payments, &a)))
            .unwrap();
        assert_eq!(removed, 2);
        assert!(store.get_by_account(&a).unwrap().is_empty());
        assert_eq!(store.get_by_account(&b).unwrap().len(), 1);
        // no recompute on the cascade path
        assert_eq!(total(&ctx, &a), Money::from_major(3));
    }
}
