use hourglass_rs::{SafeTimeProvider, TimeSource};
use std::collections::HashMap;
use tracing::{error, info, instrument};

use crate::borrowers::{Borrower, BorrowerStore, BorrowerUpdate, NewBorrower};
use crate::config::LedgerConfig;
use crate::context::LedgerContext;
use crate::decimal::Money;
use crate::errors::Result;
use crate::payments::{InterestAggregator, NewPayment, Payment, PaymentListing, PaymentStore, PaymentUpdate};
use crate::reports::{ReportBuilder, Statement, StatementView};
use crate::state::LedgerSnapshot;
use crate::storage::{MemoryStorage, Storage};
use crate::types::{AccountNumber, PaymentId};

/// the money-lending ledger
///
/// Entry point for every client operation. Mutations that touch an account
/// hold that account's lock until the borrower's `total_interest_paid` has
/// been recomputed and saved, so a caller that gets `Ok` back can read the
/// settled total straight away.
///
/// The stores are not a mutation path of their own:
///
/// ```compile_fail
/// use lending_ledger::payments::PaymentStore;
/// use lending_ledger::NewPayment;
///
/// fn record(store: &PaymentStore<'_>, new: NewPayment) {
///     let _ = store.create(new);
/// }
/// ```
pub struct Ledger {
    ctx: LedgerContext,
}

impl Ledger {
    pub fn new(storage: impl Storage + 'static, time: SafeTimeProvider, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ctx: LedgerContext::new(Box::new(storage), time, config),
        })
    }

    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::new()
    }

    pub fn clock(&self) -> &SafeTimeProvider {
        self.ctx.clock()
    }

    pub fn config(&self) -> &LedgerConfig {
        self.ctx.config()
    }

    // borrowers

    pub fn register_borrower(&self, new: NewBorrower) -> Result<Borrower> {
        BorrowerStore::new(&self.ctx).create(new)
    }

    pub fn borrower(&self, account_number: &AccountNumber) -> Result<Borrower> {
        BorrowerStore::new(&self.ctx).get(account_number)
    }

    pub fn list_borrowers(&self) -> Result<Vec<Borrower>> {
        BorrowerStore::new(&self.ctx).list()
    }

    /// blank queries return every borrower
    pub fn search_borrowers(&self, query: &str) -> Result<Vec<Borrower>> {
        let store = BorrowerStore::new(&self.ctx);
        let query = query.trim();
        if query.is_empty() {
            return store.list();
        }
        store.search(query)
    }

    #[instrument(skip_all, fields(account_number = %account_number))]
    pub fn update_borrower(&self, account_number: &AccountNumber, update: BorrowerUpdate) -> Result<Borrower> {
        let _guard = self.ctx.accounts().lock(account_number);
        BorrowerStore::new(&self.ctx).update(account_number, update)
    }

    #[instrument(skip_all, fields(account_number = %account_number))]
    pub fn delete_borrower(&self, account_number: &AccountNumber) -> Result<bool> {
        let _guard = self.ctx.accounts().lock(account_number);
        BorrowerStore::new(&self.ctx).delete(account_number)
    }

    // payments

    #[instrument(skip_all, fields(account_number = %new.account_number))]
    pub fn record_payment(&self, new: NewPayment) -> Result<Payment> {
        let _guard = self.ctx.accounts().lock(&new.account_number);
        PaymentStore::new(&self.ctx).create(new)
    }

    pub fn payment(&self, id: PaymentId) -> Result<Payment> {
        PaymentStore::new(&self.ctx).get(id)
    }

    /// payment history for one account, newest first
    pub fn payments_for(&self, account_number: &AccountNumber) -> Result<Vec<Payment>> {
        PaymentStore::new(&self.ctx).get_by_account(account_number)
    }

    /// every payment with its borrower's name and phone, newest first
    #[instrument(skip(self))]
    pub fn list_payments(&self) -> Result<Vec<PaymentListing>> {
        let borrowers: HashMap<AccountNumber, Borrower> = self
            .ctx
            .load_borrowers()?
            .into_iter()
            .map(|b| (b.account_number.clone(), b))
            .collect();

        Ok(PaymentStore::new(&self.ctx)
            .list()?
            .into_iter()
            .filter_map(|payment| {
                let borrower = borrowers.get(&payment.account_number)?;
                Some(PaymentListing {
                    name: borrower.name.clone(),
                    phone_no: borrower.phone_no.clone(),
                    payment,
                })
            })
            .collect())
    }

    #[instrument(skip_all, fields(payment_id = %id))]
    pub fn update_payment(&self, id: PaymentId, update: PaymentUpdate) -> Result<Payment> {
        let store = PaymentStore::new(&self.ctx);
        // the owning account never changes, so it is safe to read it unlocked
        let account_number = store.get(id)?.account_number;
        let _guard = self.ctx.accounts().lock(&account_number);
        store.update(id, update)
    }

    #[instrument(skip_all, fields(payment_id = %id))]
    pub fn delete_payment(&self, id: PaymentId) -> Result<bool> {
        let store = PaymentStore::new(&self.ctx);
        let account_number = match store.get(id) {
            Ok(payment) => payment.account_number,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };
        let _guard = self.ctx.accounts().lock(&account_number);
        store.delete(id)
    }

    /// rerun the aggregator for one account; `None` when the borrower is gone
    #[instrument(skip_all, fields(account_number = %account_number))]
    pub fn recompute(&self, account_number: &AccountNumber) -> Result<Option<Money>> {
        let _guard = self.ctx.accounts().lock(account_number);
        InterestAggregator::new(&self.ctx).recompute(account_number)
    }

    // reports

    #[instrument(skip_all, fields(account_number = %account_number))]
    pub fn statement(&self, account_number: &AccountNumber) -> Result<Statement> {
        ReportBuilder::new(&self.ctx).build_statement(account_number)
    }

    /// statement formatted with the configured currency
    pub fn statement_view(&self, account_number: &AccountNumber) -> Result<StatementView> {
        let statement = self.statement(account_number)?;
        Ok(StatementView::from_statement(&statement, &self.ctx.config().currency))
    }

    /// amount to prefill when recording a payment: monthly interest to two places
    #[instrument(skip_all, fields(account_number = %account_number))]
    pub fn suggested_payment(&self, account_number: &AccountNumber) -> Result<Money> {
        Ok(self.borrower(account_number)?.monthly_interest()?.round_currency())
    }

    // backup

    #[instrument(skip(self))]
    pub fn export_snapshot(&self) -> Result<LedgerSnapshot> {
        let payments = self.ctx.load_payments()?;
        let borrowers = self.ctx.load_borrowers()?;
        Ok(LedgerSnapshot::capture(borrowers, payments, self.ctx.now()))
    }

    /// replace all data with `snapshot` and recompute every total
    ///
    /// Stored totals in the snapshot are ignored. Should not run alongside
    /// other mutations.
    #[instrument(skip_all, fields(borrowers = snapshot.borrowers.len(), payments = snapshot.payments.len()))]
    pub fn import_snapshot(&self, snapshot: LedgerSnapshot) -> Result<()> {
        snapshot.validate()?;
        let previous = self.export_snapshot()?;

        let outcome = self
            .ctx
            .replace_all(&snapshot.borrowers, &snapshot.payments)
            .and_then(|_| InterestAggregator::new(&self.ctx).recompute_all());

        match outcome {
            Ok(count) => {
                info!(recomputed = count, "snapshot imported");
                Ok(())
            }
            Err(e) => {
                if let Err(restore_err) = self.ctx.replace_all(&previous.borrowers, &previous.payments) {
                    error!(error = %restore_err, "could not restore ledger after failed import");
                }
                Err(e)
            }
        }
    }
}

/// builder for creating a ledger
pub struct LedgerBuilder {
    storage: Option<Box<dyn Storage>>,
    time: Option<SafeTimeProvider>,
    config: LedgerConfig,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            time: None,
            config: LedgerConfig::default(),
        }
    }

    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn time(mut self, time: SafeTimeProvider) -> Self {
        self.time = Some(time);
        self
    }

    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// defaults to in-memory storage and the system clock
    pub fn build(self) -> Result<Ledger> {
        self.config.validate()?;
        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let time = self
            .time
            .unwrap_or_else(|| SafeTimeProvider::new(TimeSource::System));
        Ok(Ledger {
            ctx: LedgerContext::new(storage, time, self.config),
        })
    }
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
