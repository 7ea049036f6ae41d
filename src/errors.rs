use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;
use crate::types::{AccountNumber, PaymentId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("borrower not found: {account_number}")]
    BorrowerNotFound {
        account_number: AccountNumber,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: PaymentId,
    },

    #[error("account number space exhausted after {attempts} attempts")]
    CapacityExhausted {
        attempts: u32,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("could not read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// coarse error classes surfaced to callers such as an http front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    CapacityExhausted,
    StorageFailure,
}

impl ErrorKind {
    /// http status a front end should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::CapacityExhausted => 507,
            ErrorKind::StorageFailure => 500,
        }
    }
}

impl LedgerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation { .. } => ErrorKind::Validation,
            LedgerError::BorrowerNotFound { .. } | LedgerError::PaymentNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::CapacityExhausted { .. } => ErrorKind::CapacityExhausted,
            LedgerError::Storage(_) | LedgerError::ConfigRead { .. } => ErrorKind::StorageFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityKind;

    #[test]
    fn test_kind_mapping() {
        let err = LedgerError::validation("name", "must not be empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "invalid name: must not be empty");

        let err = LedgerError::BorrowerNotFound {
            account_number: AccountNumber::parse("1234").unwrap(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.kind().status_code(), 404);

        let err = LedgerError::from(StorageError::Unavailable {
            kind: EntityKind::Payments,
            message: "disk offline".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert_eq!(err.kind().status_code(), 500);
    }
}
