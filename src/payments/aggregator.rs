use tracing::{debug, instrument};

use super::Payment;
use crate::context::LedgerContext;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::AccountNumber;

/// sum of payment amounts for one account
///
/// Fails with a validation error when the sum does not fit a `Decimal`.
pub fn total_for(account_number: &AccountNumber, payments: &[Payment]) -> Result<Money> {
    payments
        .iter()
        .filter(|p| &p.account_number == account_number)
        .try_fold(Money::ZERO, |total, p| {
            total.checked_add(p.payment_amount).ok_or_else(|| {
                LedgerError::validation(
                    "payment_amount",
                    format!("total for account {} overflows", account_number),
                )
            })
        })
}

/// keeps each borrower's `total_interest_paid` equal to the sum of its payments
///
/// Always a full recompute from the payment collection, never an
/// incremental adjustment.
pub struct InterestAggregator<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> InterestAggregator<'a> {
    pub(crate) fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// recompute and persist the total for `account_number`
    ///
    /// Returns the new total, or `None` when the borrower no longer exists.
    #[instrument(skip_all, fields(account_number = %account_number))]
    pub(crate) fn recompute(&self, account_number: &AccountNumber) -> Result<Option<Money>> {
        let payments = self.ctx.load_payments()?;
        let total = total_for(account_number, &payments)?;
        let now = self.ctx.now();

        let updated = self.ctx.modify_borrowers(|borrowers| {
            Ok(borrowers
                .iter_mut()
                .find(|b| &b.account_number == account_number)
                .map(|borrower| {
                    borrower.total_interest_paid = total;
                    borrower.updated_at = now;
                }))
        })?;

        match updated {
            Some(()) => {
                debug!(total = %total, "total interest paid recomputed");
                Ok(Some(total))
            }
            None => {
                debug!("borrower gone, nothing to recompute");
                Ok(None)
            }
        }
    }

    /// recompute every borrower in one pass over the payments
    pub(crate) fn recompute_all(&self) -> Result<usize> {
        let payments = self.ctx.load_payments()?;
        let now = self.ctx.now();
        self.ctx.modify_borrowers(|borrowers| {
            for borrower in borrowers.iter_mut() {
                borrower.total_interest_paid = total_for(&borrower.account_number, &payments)?;
                borrower.updated_at = now;
            }
            Ok(borrowers.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrowers::NewBorrower;
    use crate::config::LedgerConfig;
    use crate::decimal::Rate;
    use crate::storage::MemoryStorage;
    use crate::types::PaymentMonth;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn context() -> LedgerContext {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        ));
        LedgerContext::new(Box::new(MemoryStorage::new()), time, LedgerConfig::default())
    }

    fn payment(account: &AccountNumber, amount: Money) -> Payment {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Payment {
            id: Uuid::new_v4(),
            account_number: account.clone(),
            payment_amount: amount,
            payment_month: PaymentMonth::parse("2024-01").unwrap(),
            payment_date: at,
            created_at: at,
            updated_at: at,
        }
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

    #[test]
    fn test_total_for_filters_by_account() {
        let a = AccountNumber::parse("1000").unwrap();
        let b = AccountNumber::parse("2000").unwrap();
        let payments = vec![
            payment(&a, Money::from_decimal(dec!(150.00))),
            payment(&b, Money::from_decimal(dec!(999.99))),
            payment(&a, Money::from_decimal(dec!(50.00))),
        ];

        assert_eq!(total_for(&a, &payments).unwrap(), Money::from_major(200));
        assert_eq!(total_for(&AccountNumber::parse("3000").unwrap(), &payments).unwrap(), Money::ZERO);

        let huge = vec![
            payment(&a, Money::from_decimal(rust_decimal::Decimal::MAX)),
            payment(&a, Money::from_decimal(rust_decimal::Decimal::MAX)),
        ];
        assert!(matches!(
            total_for(&a, &huge),
            Err(LedgerError::Validation { field: "payment_amount", .. })
        ));
    }

    #[test]
    fn test_recompute_overwrites_a_drifted_total() {
        let ctx = context();
        let account = seed_borrower(&ctx, "1234");
        ctx.modify_payments(|p| {
            p.push(payment(&account, Money::from_major(150)));
            p.push(payment(&account, Money::from_major(50)));
            Ok(())
        })
        .unwrap();
        // simulate a stale stored total
        ctx.modify_borrowers(|b| {
            b[0].total_interest_paid = Money::from_major(12_345);
            Ok(())
        })
        .unwrap();

        let aggregator = InterestAggregator::new(&ctx);
        assert_eq!(aggregator.recompute(&account).unwrap(), Some(Money::from_major(200)));
        assert_eq!(ctx.load_borrowers().unwrap()[0].total_interest_paid, Money::from_major(200));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let ctx = context();
        let account = seed_borrower(&ctx, "1234");
        ctx.modify_payments(|p| {
            p.push(payment(&account, Money::from_decimal(dec!(33.33))));
            Ok(())
        })
        .unwrap();

        let aggregator = InterestAggregator::new(&ctx);
        let first = aggregator.recompute(&account).unwrap();
        let second = aggregator.recompute(&account).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.load_borrowers().unwrap()[0].total_interest_paid, Money::from_decimal(dec!(33.33)));
    }

    #[test]
    fn test_recompute_missing_borrower_is_a_no_op() {
        let ctx = context();
        let aggregator = InterestAggregator::new(&ctx);
        assert_eq!(aggregator.recompute(&AccountNumber::parse("4321").unwrap()).unwrap(), None);
        assert!(ctx.load_borrowers().unwrap().is_empty());
    }

    #[test]
    fn test_recompute_all() {
        let ctx = context();
        let a = seed_borrower(&ctx, "1111");
        let b = seed_borrower(&ctx, "2222");
        ctx.modify_payments(|p| {
            p.push(payment(&a, Money::from_major(10)));
            p.push(payment(&a, Money::from_major(5)));
            Ok(())
        })
        .unwrap();

        assert_eq!(InterestAggregator::new(&ctx).recompute_all().unwrap(), 2);
        let borrowers = ctx.load_borrowers().unwrap();
        let total = |acct: &AccountNumber| {
            borrowers.iter().find(|x| &x.account_number == acct).unwrap().total_interest_paid
        };
        assert_eq!(total(&a), Money::from_major(15));
        assert_eq!(total(&b), Money::ZERO);
    }
}
