//! presentation-ready form of a statement
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Statement;
use crate::config::CurrencyConfig;
use crate::decimal::Money;
use crate::types::AccountNumber;

/// statement with every amount already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementView {
    pub account_number: AccountNumber,
    pub name: String,
    pub phone_no: String,
    pub city: String,
    pub loan_amount: String,
    pub interest_rate: String,
    pub monthly_interest: String,
    pub total_interest_paid: String,
    pub payments: Vec<PaymentRow>,
    pub generated_at: DateTime<Utc>,
}

/// one line of the payment history table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_month: String,
    pub payment_date: String,
    pub amount: String,
}

impl StatementView {
    pub fn from_statement(statement: &Statement, currency: &CurrencyConfig) -> Self {
        let fmt = |m: Money| format_currency(m, currency);
        let borrower = &statement.borrower;

        StatementView {
            account_number: borrower.account_number.clone(),
            name: borrower.name.clone(),
            phone_no: borrower.phone_no.clone(),
            city: borrower.city.clone(),
            loan_amount: fmt(borrower.loan_amount),
            interest_rate: borrower.interest_rate.to_string(),
            monthly_interest: fmt(statement.monthly_interest),
            total_interest_paid: fmt(statement.total_interest_paid),
            payments: statement
                .payment_history
                .iter()
                .map(|p| PaymentRow {
                    payment_month: p.payment_month.to_string(),
                    payment_date: p.payment_date.format("%d/%m/%Y %H:%M").to_string(),
                    amount: fmt(p.payment_amount),
                })
                .collect(),
            generated_at: statement.generated_at,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `Rs. 200.00` style rendering
pub fn format_currency(amount: Money, currency: &CurrencyConfig) -> String {
    let digits = amount.to_fixed(currency.decimal_places);
    if currency.symbol.is_empty() {
        digits
    } else {
        format!("{} {}", currency.symbol, digits)
    }
}
