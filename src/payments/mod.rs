pub mod aggregator;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{deserialize_lenient, Money};
use crate::errors::{LedgerError, Result};
use crate::types::{AccountNumber, PaymentId, PaymentMonth};

pub use aggregator::InterestAggregator;
pub use store::PaymentStore;

/// an interest payment recorded against a borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredPayment")]
pub struct Payment {
    pub id: PaymentId,
    pub account_number: AccountNumber,
    pub payment_amount: Money,
    pub payment_month: PaymentMonth,
    /// wall-clock time the payment was recorded
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// apply an edit; id and account number are fixed
    pub(crate) fn apply(&mut self, update: PaymentUpdate, now: DateTime<Utc>) {
        if let Some(amount) = update.payment_amount {
            self.payment_amount = amount;
        }
        if let Some(month) = update.payment_month {
            self.payment_month = month;
        }
        self.updated_at = now;
    }
}

/// on-disk shape, older records carry no `updated_at`
#[derive(Deserialize)]
struct StoredPayment {
    id: PaymentId,
    account_number: AccountNumber,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    payment_amount: Money,
    payment_month: PaymentMonth,
    payment_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredPayment> for Payment {
    fn from(p: StoredPayment) -> Self {
        Payment {
            id: p.id,
            account_number: p.account_number,
            payment_amount: p.payment_amount,
            payment_month: p.payment_month,
            payment_date: p.payment_date,
            created_at: p.created_at,
            updated_at: p.updated_at.unwrap_or(p.created_at),
        }
    }
}

/// a payment to record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub account_number: AccountNumber,
    pub payment_amount: Money,
    pub payment_month: PaymentMonth,
}

impl NewPayment {
    pub fn new(account_number: AccountNumber, payment_amount: Money, payment_month: PaymentMonth) -> Self {
        Self {
            account_number,
            payment_amount,
            payment_month,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.payment_amount)
    }
}

/// partial edit of a payment, only amount and month are editable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaymentUpdate {
    pub payment_amount: Option<Money>,
    pub payment_month: Option<PaymentMonth>,
}

impl PaymentUpdate {
    pub fn amount(mut self, amount: Money) -> Self {
        self.payment_amount = Some(amount);
        self
    }

    pub fn month(mut self, month: PaymentMonth) -> Self {
        self.payment_month = Some(month);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.payment_amount {
            validate_amount(amount)?;
        }
        Ok(())
    }
}

/// a payment joined with the borrower it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListing {
    #[serde(flatten)]
    pub payment: Payment,
    pub name: String,
    pub phone_no: String,
}

fn validate_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::validation(
            "payment_amount",
            format!("must be greater than zero, got {}", amount),
        ));
    }
    Ok(())
}

/// sort newest payment first; ties keep the most recently inserted first
pub(crate) fn sort_by_payment_date_desc(payments: &mut Vec<Payment>) {
    payments.reverse();
    payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn payment(day: u32, amount: i64) -> Payment {
        let at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Payment {
            id: Uuid::new_v4(),
            account_number: AccountNumber::parse("1234").unwrap(),
            payment_amount: Money::from_major(amount),
            payment_month: PaymentMonth::parse("2024-01").unwrap(),
            payment_date: at,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_amount_validation() {
        let account = AccountNumber::parse("1234").unwrap();
        let month = PaymentMonth::parse("2024-01").unwrap();
        assert!(NewPayment::new(account.clone(), Money::from_major(150), month).validate().is_ok());
        assert!(NewPayment::new(account.clone(), Money::ZERO, month).validate().is_err());
        assert!(NewPayment::new(account, Money::from_decimal(dec!(-5)), month).validate().is_err());
        assert!(PaymentUpdate::default().amount(Money::ZERO).validate().is_err());
        assert!(PaymentUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_update_touches_only_editable_fields() {
        let mut p = payment(5, 150);
        let before = p.clone();
        let later = before.created_at + chrono::Duration::hours(1);

        p.apply(PaymentUpdate::default().amount(Money::from_major(100)), later);

        assert_eq!(p.payment_amount, Money::from_major(100));
        assert_eq!(p.payment_month, before.payment_month);
        assert_eq!(p.id, before.id);
        assert_eq!(p.account_number, before.account_number);
        assert_eq!(p.payment_date, before.payment_date);
        assert_eq!(p.updated_at, later);

        assert!(serde_json::from_str::<PaymentUpdate>(r#"{ "id": "x" }"#).is_err());
        assert!(serde_json::from_str::<PaymentUpdate>(r#"{ "account_number": "1234" }"#).is_err());
    }

    #[test]
    fn test_sort_newest_first() {
        let old = payment(1, 10);
        let new = payment(9, 20);
        let tie_first = payment(5, 30);
        let mut tie_second = payment(5, 40);
        tie_second.payment_date = tie_first.payment_date;

        let mut list = vec![old.clone(), tie_first.clone(), new.clone(), tie_second.clone()];
        sort_by_payment_date_desc(&mut list);

        let ids: Vec<_> = list.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![new.id, tie_second.id, tie_first.id, old.id]);
    }

    #[test]
    fn test_round_trip_keeps_updated_at() {
        let p = payment(3, 75);
        let json = serde_json::to_string(&p).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
