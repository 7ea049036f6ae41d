use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{LedgerError, Result};

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LedgerConfig {
    pub account_numbers: AccountNumberConfig,
    pub currency: CurrencyConfig,
}

/// account number allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountNumberConfig {
    /// smallest number handed out, inclusive
    pub min: u16,
    /// largest number handed out, inclusive
    pub max: u16,
    /// random draws before giving up with `CapacityExhausted`
    pub max_attempts: u32,
}

impl Default for AccountNumberConfig {
    fn default() -> Self {
        Self {
            min: 1000,
            max: 9999,
            max_attempts: 10_000,
        }
    }
}

impl AccountNumberConfig {
    /// number of distinct account numbers in the range
    pub fn capacity(&self) -> usize {
        (self.max as usize).saturating_sub(self.min as usize) + 1
    }
}

/// presentation of currency amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub symbol: String,
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: "Rs.".to_string(),
            decimal_places: 2,
        }
    }
}

impl LedgerConfig {
    /// parse from json, missing sections fall back to defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)
            .map_err(|e| LedgerError::validation("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// read a json config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LedgerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let ids = &self.account_numbers;
        if ids.min < 1000 || ids.max > 9999 {
            return Err(LedgerError::validation(
                "account_numbers",
                format!("range {}..={} must stay within 1000..=9999", ids.min, ids.max),
            ));
        }
        if ids.min > ids.max {
            return Err(LedgerError::validation(
                "account_numbers",
                format!("min {} exceeds max {}", ids.min, ids.max),
            ));
        }
        if ids.max_attempts == 0 {
            return Err(LedgerError::validation(
                "account_numbers.max_attempts",
                "must be at least 1",
            ));
        }
        if self.currency.decimal_places > 8 {
            return Err(LedgerError::validation(
                "currency.decimal_places",
                "at most 8 places are tracked",
            ));
        }
        Ok(())
    }
}
