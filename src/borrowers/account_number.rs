use rand::Rng;
use std::collections::HashSet;
use tracing::warn;

use crate::config::AccountNumberConfig;
use crate::errors::{LedgerError, Result};
use crate::types::AccountNumber;

/// draws random account numbers until one is not in use
pub struct AccountNumberGenerator<'a> {
    config: &'a AccountNumberConfig,
}

impl<'a> AccountNumberGenerator<'a> {
    pub fn new(config: &'a AccountNumberConfig) -> Self {
        Self { config }
    }

    /// pick an unused number uniformly from the configured range
    ///
    /// Gives up with `CapacityExhausted` once every number in the range is
    /// taken or after `max_attempts` draws, whichever comes first.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        existing: &HashSet<AccountNumber>,
        rng: &mut R,
    ) -> Result<AccountNumber> {
        let in_range = existing
            .iter()
            .filter_map(|a| a.as_str().parse::<u16>().ok())
            .filter(|n| (self.config.min..=self.config.max).contains(n))
            .count();
        if in_range >= self.config.capacity() {
            warn!(capacity = self.config.capacity(), "account number range saturated");
            return Err(LedgerError::CapacityExhausted { attempts: 0 });
        }

        for _ in 0..self.config.max_attempts {
            let candidate = AccountNumber::from_number(rng.random_range(self.config.min..=self.config.max))?;
            if !existing.contains(&candidate) {
                return Ok(candidate);
            }
        }

        warn!(
            attempts = self.config.max_attempts,
            in_use = in_range,
            "gave up drawing account numbers"
        );
        Err(LedgerError::CapacityExhausted {
            attempts: self.config.max_attempts,
        })
    }
}
