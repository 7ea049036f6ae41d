use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// four digit borrower account number, the borrower's primary key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    pub const DIGITS: usize = 4;

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != Self::DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::validation(
                "account_number",
                format!("expected {} digits, got {:?}", Self::DIGITS, s),
            ));
        }
        Ok(AccountNumber(s.to_string()))
    }

    /// build from a number in `1000..=9999`
    pub fn from_number(n: u16) -> Result<Self> {
        if !(1000..=9999).contains(&n) {
            return Err(LedgerError::validation(
                "account_number",
                format!("{} is outside 1000..=9999", n),
            ));
        }
        Ok(AccountNumber(n.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        AccountNumber::parse(s)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self> {
        AccountNumber::parse(&s)
    }
}

impl From<AccountNumber> for String {
    fn from(a: AccountNumber) -> Self {
        a.0
    }
}

/// the obligation period a payment covers, `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentMonth {
    year: i32,
    month: u32,
}

impl PaymentMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        // day one of the month must exist for the pair to be a real period
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            LedgerError::validation("payment_month", format!("{}-{} is not a month", year, month))
        })?;
        if !(1..=9999).contains(&year) {
            return Err(LedgerError::validation(
                "payment_month",
                format!("year {} out of range", year),
            ));
        }
        Ok(PaymentMonth { year, month })
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map_err(|_| {
                LedgerError::validation("payment_month", format!("expected YYYY-MM, got {:?}", s))
            })
            .and_then(|d| PaymentMonth::new(d.year(), d.month()))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for PaymentMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PaymentMonth {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        PaymentMonth::parse(s)
    }
}

impl TryFrom<String> for PaymentMonth {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self> {
        PaymentMonth::parse(&s)
    }
}

impl From<PaymentMonth> for String {
    fn from(m: PaymentMonth) -> Self {
        m.to_string()
    }
}

/// the two persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Borrowers,
    Payments,
}

impl EntityKind {
    /// key the collection is stored under
    pub fn storage_key(&self) -> &'static str {
        match self {
            EntityKind::Borrowers => "money_lending_borrowers",
            EntityKind::Payments => "money_lending_payments",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Borrowers => f.write_str("borrowers"),
            EntityKind::Payments => f.write_str("payments"),
        }
    }
}
