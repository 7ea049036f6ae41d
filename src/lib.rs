pub mod borrowers;
pub mod config;
pub(crate) mod context;
pub mod decimal;
pub mod errors;
pub mod ledger;
pub mod locks;
pub mod payments;
pub mod reports;
pub mod state;
pub mod storage;
pub mod types;

// re-export key types
pub use borrowers::{Borrower, BorrowerUpdate, NewBorrower};
pub use config::{AccountNumberConfig, CurrencyConfig, LedgerConfig};
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LedgerError, Result};
pub use ledger::{Ledger, LedgerBuilder};
pub use payments::{NewPayment, Payment, PaymentListing, PaymentUpdate};
pub use reports::{PaymentRow, Statement, StatementView};
pub use state::LedgerSnapshot;
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use types::{AccountNumber, EntityKind, PaymentId, PaymentMonth};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
