use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::borrowers::Borrower;
use crate::errors::{LedgerError, Result};
use crate::payments::Payment;

/// full copy of the ledger for backup and restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub borrowers: Vec<Borrower>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    pub exported_at: DateTime<Utc>,
}

impl LedgerSnapshot {
    pub fn capture(borrowers: Vec<Borrower>, payments: Vec<Payment>, exported_at: DateTime<Utc>) -> Self {
        Self {
            borrowers,
            payments,
            exported_at,
        }
    }

    /// unique account numbers, unique payment ids, no orphan payments
    pub fn validate(&self) -> Result<()> {
        let mut accounts = HashSet::new();
        for borrower in &self.borrowers {
            if !accounts.insert(&borrower.account_number) {
                return Err(LedgerError::validation(
                    "borrowers",
                    format!("duplicate account number {}", borrower.account_number),
                ));
            }
        }

        let mut ids = HashSet::new();
        for payment in &self.payments {
            if !ids.insert(payment.id) {
                return Err(LedgerError::validation(
                    "payments",
                    format!("duplicate payment id {}", payment.id),
                ));
            }
            if !accounts.contains(&payment.account_number) {
                return Err(LedgerError::validation(
                    "payments",
                    format!("payment {} references unknown account {}", payment.id, payment.account_number),
                ));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LedgerError::validation("snapshot", e.to_string()))
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrowers::NewBorrower;
    use crate::decimal::{Money, Rate};
    use crate::types::{AccountNumber, PaymentMonth};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn borrower(account: &str) -> Borrower {
        NewBorrower::new("Asha", "98765", "Pune", Money::from_major(10_000), Rate::from_percentage(2))
            .into_borrower(AccountNumber::parse(account).unwrap(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn payment(account: &str) -> Payment {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Payment {
            id: Uuid::new_v4(),
            account_number: AccountNumber::parse(account).unwrap(),
            payment_amount: Money::from_major(10),
            payment_month: PaymentMonth::parse("2024-01").unwrap(),
            payment_date: at,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_validate() {
        let now = Utc::now();
        let ok = LedgerSnapshot::capture(vec![borrower("1000")], vec![payment("1000")], now);
        assert!(ok.validate().is_ok());

        let orphan = LedgerSnapshot::capture(vec![borrower("1000")], vec![payment("2000")], now);
        assert!(orphan.validate().is_err());

        let dup = LedgerSnapshot::capture(vec![borrower("1000"), borrower("1000")], vec![], now);
        assert!(dup.validate().is_err());

        let p = payment("1000");
        let dup_ids = LedgerSnapshot::capture(vec![borrower("1000")], vec![p.clone(), p], now);
        assert!(dup_ids.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = LedgerSnapshot::capture(vec![borrower("1000")], vec![payment("1000")], Utc::now());
        let json = snapshot.to_json_pretty().unwrap();
        assert_eq!(LedgerSnapshot::from_json(&json).unwrap(), snapshot);
        assert!(LedgerSnapshot::from_json("[]").is_err());
    }
}
