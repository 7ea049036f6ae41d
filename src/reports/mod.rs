pub mod serialization;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::borrowers::{Borrower, BorrowerStore};
use crate::context::LedgerContext;
use crate::decimal::Money;
use crate::errors::Result;
use crate::payments::{Payment, PaymentStore};
use crate::types::AccountNumber;

pub use serialization::{PaymentRow, StatementView};

/// read-only statement for one borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub borrower: Borrower,
    /// `loan_amount * interest_rate / 100`, unrounded
    pub monthly_interest: Money,
    /// newest first
    pub payment_history: Vec<Payment>,
    pub total_interest_paid: Money,
    pub generated_at: DateTime<Utc>,
}

impl Statement {
    /// monthly interest rounded to two places, as shown at payment entry
    pub fn monthly_interest_display(&self) -> String {
        self.monthly_interest.to_currency_string()
    }

    pub fn total_interest_paid_display(&self) -> String {
        self.total_interest_paid.to_currency_string()
    }

    pub fn payment_count(&self) -> usize {
        self.payment_history.len()
    }
}

/// assembles statements from the two stores
pub struct ReportBuilder<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> ReportBuilder<'a> {
    pub(crate) fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    pub fn build_statement(&self, account_number: &AccountNumber) -> Result<Statement> {
        let borrower = BorrowerStore::new(self.ctx).get(account_number)?;
        let payment_history = PaymentStore::new(self.ctx).get_by_account(account_number)?;

        Ok(Statement {
            monthly_interest: borrower.monthly_interest()?,
            total_interest_paid: borrower.total_interest_paid,
            payment_history,
            borrower,
            generated_at: self.ctx.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrowers::NewBorrower;
    use crate::config::LedgerConfig;
    use crate::decimal::Rate;
    use crate::payments::NewPayment;
    use crate::storage::MemoryStorage;
    use crate::types::PaymentMonth;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    fn context() -> LedgerContext {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        ));
        LedgerContext::new(Box::new(MemoryStorage::new()), time, LedgerConfig::default())
    }

    #[test]
    fn test_statement_contents() {
        let ctx = context();
        let control = ctx.clock().test_control().unwrap();
        let borrower = BorrowerStore::new(&ctx)
            .create(NewBorrower::new("Asha", "98765", "Pune", Money::from_major(10_000), Rate::from_percentage(2)))
            .unwrap();
        let payments = PaymentStore::new(&ctx);
        let jan = payments
            .create(NewPayment::new(borrower.account_number.clone(), Money::from_major(150), PaymentMonth::parse("2024-01").unwrap()))
            .unwrap();
        control.advance(Duration::days(31));
        let feb = payments
            .create(NewPayment::new(borrower.account_number.clone(), Money::from_major(50), PaymentMonth::parse("2024-02").unwrap()))
            .unwrap();

        let statement = ReportBuilder::new(&ctx).build_statement(&borrower.account_number).unwrap();

        assert_eq!(statement.monthly_interest_display(), "200.00");
        assert_eq!(statement.total_interest_paid, Money::from_major(200));
        assert_eq!(statement.total_interest_paid_display(), "200.00");
        assert_eq!(statement.payment_count(), 2);
        assert_eq!(statement.payment_history[0].id, feb.id);
        assert_eq!(statement.payment_history[1].id, jan.id);
        assert_eq!(statement.generated_at, ctx.now());
    }

    #[test]
    fn test_fractional_rate_rounds_for_display() {
        let ctx = context();
        let borrower = BorrowerStore::new(&ctx)
            .create(NewBorrower::new("Ravi", "1", "Nagpur", Money::from_major(12_345), Rate::from_percent(dec!(1.5))))
            .unwrap();

        let statement = ReportBuilder::new(&ctx).build_statement(&borrower.account_number).unwrap();
        assert_eq!(statement.monthly_interest, Money::from_decimal(dec!(185.175)));
        assert_eq!(statement.monthly_interest_display(), "185.18");
        assert!(statement.payment_history.is_empty());
    }

    #[test]
    fn test_missing_borrower() {
        let ctx = context();
        let err = ReportBuilder::new(&ctx)
            .build_statement(&AccountNumber::parse("1234").unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
