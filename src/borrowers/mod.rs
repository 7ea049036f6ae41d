pub mod account_number;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{deserialize_lenient, Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::AccountNumber;

pub use account_number::AccountNumberGenerator;
pub use store::BorrowerStore;

/// a loan customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub account_number: AccountNumber,
    pub name: String,
    pub phone_no: String,
    pub city: String,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    /// sum of this borrower's payments, written only by the aggregator
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub total_interest_paid: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Borrower {
    /// interest due each period: `loan_amount * interest_rate / 100`
    pub fn monthly_interest(&self) -> Result<Money> {
        monthly_interest(self.loan_amount, self.interest_rate)
    }

    /// case-insensitive on name and city, plain substring on account and phone
    pub fn matches(&self, query: &str) -> bool {
        let folded = query.to_lowercase();
        self.name.to_lowercase().contains(&folded)
            || self.city.to_lowercase().contains(&folded)
            || self.account_number.as_str().contains(query)
            || self.phone_no.contains(query)
    }

    /// apply an edit; the account number and the paid total cannot be set here
    pub(crate) fn apply(&mut self, update: BorrowerUpdate, now: DateTime<Utc>) {
        let BorrowerUpdate {
            name,
            phone_no,
            city,
            loan_amount,
            interest_rate,
        } = update;
        if let Some(name) = name {
            self.name = name.trim().to_string();
        }
        if let Some(phone_no) = phone_no {
            self.phone_no = phone_no.trim().to_string();
        }
        if let Some(city) = city {
            self.city = city.trim().to_string();
        }
        if let Some(loan_amount) = loan_amount {
            self.loan_amount = loan_amount;
        }
        if let Some(interest_rate) = interest_rate {
            self.interest_rate = interest_rate;
        }
        self.updated_at = now;
    }
}

/// registration form for a new borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBorrower {
    pub name: String,
    pub phone_no: String,
    pub city: String,
    pub loan_amount: Money,
    pub interest_rate: Rate,
}

impl NewBorrower {
    pub fn new(
        name: impl Into<String>,
        phone_no: impl Into<String>,
        city: impl Into<String>,
        loan_amount: Money,
        interest_rate: Rate,
    ) -> Self {
        Self {
            name: name.into(),
            phone_no: phone_no.into(),
            city: city.into(),
            loan_amount,
            interest_rate,
        }
    }

    /// every field is required: text non-blank, amounts strictly positive
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("phone_no", &self.phone_no)?;
        require_text("city", &self.city)?;
        require_positive_amount("loan_amount", self.loan_amount)?;
        require_positive_rate("interest_rate", self.interest_rate)?;
        monthly_interest(self.loan_amount, self.interest_rate)?;
        Ok(())
    }

    pub(crate) fn into_borrower(self, account_number: AccountNumber, now: DateTime<Utc>) -> Borrower {
        Borrower {
            account_number,
            name: self.name.trim().to_string(),
            phone_no: self.phone_no.trim().to_string(),
            city: self.city.trim().to_string(),
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            total_interest_paid: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// partial edit of a borrower, `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorrowerUpdate {
    pub name: Option<String>,
    pub phone_no: Option<String>,
    pub city: Option<String>,
    pub loan_amount: Option<Money>,
    pub interest_rate: Option<Rate>,
}

impl BorrowerUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn phone_no(mut self, phone_no: impl Into<String>) -> Self {
        self.phone_no = Some(phone_no.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn loan_amount(mut self, amount: Money) -> Self {
        self.loan_amount = Some(amount);
        self
    }

    pub fn interest_rate(mut self, rate: Rate) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == BorrowerUpdate::default()
    }

    /// supplied fields follow the same rules as registration
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(phone_no) = &self.phone_no {
            require_text("phone_no", phone_no)?;
        }
        if let Some(city) = &self.city {
            require_text("city", city)?;
        }
        if let Some(amount) = self.loan_amount {
            require_positive_amount("loan_amount", amount)?;
        }
        if let Some(rate) = self.interest_rate {
            require_positive_rate("interest_rate", rate)?;
        }
        Ok(())
    }
}

fn monthly_interest(loan_amount: Money, interest_rate: Rate) -> Result<Money> {
    loan_amount.checked_percentage(interest_rate).ok_or_else(|| {
        LedgerError::validation(
            "loan_amount",
            format!("{} at {} overflows the monthly interest", loan_amount, interest_rate),
        )
    })
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation(field, "is required"));
    }
    Ok(())
}

fn require_positive_amount(field: &'static str, amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::validation(field, format!("must be greater than zero, got {}", amount)));
    }
    Ok(())
}

fn require_positive_rate(field: &'static str, rate: Rate) -> Result<()> {
    if rate.is_zero() || rate.is_negative() {
        return Err(LedgerError::validation(field, format!("must be greater than zero, got {}", rate)));
    }
    Ok(())
}
