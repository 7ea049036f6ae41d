/// backup - persist to json files, export a snapshot and restore it elsewhere
use lending_ledger::{
    JsonFileStorage, Ledger, LedgerSnapshot, Money, NewBorrower, NewPayment, PaymentMonth, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("lending_ledger=debug"))
        .init();

    let dir = tempfile::tempdir()?;
    let ledger = Ledger::builder()
        .storage(JsonFileStorage::open(dir.path())?)
        .build()?;

    let borrower = ledger.register_borrower(NewBorrower::new(
        "Meena Shah",
        "9876554321",
        "Surat",
        Money::from_major(50_000),
        Rate::from_percentage(3),
    ))?;
    ledger.record_payment(NewPayment::new(
        borrower.account_number.clone(),
        Money::from_major(1_500),
        PaymentMonth::parse("2024-04")?,
    ))?;

    let json = ledger.export_snapshot()?.to_json_pretty()?;
    println!("{}", json);

    // restore into a fresh in-memory ledger
    let restored = Ledger::builder().build()?;
    restored.import_snapshot(LedgerSnapshot::from_json(&json)?)?;
    let copy = restored.borrower(&borrower.account_number)?;
    println!("restored {} with {} paid", copy.name, copy.total_interest_paid.to_currency_string());

    Ok(())
}
