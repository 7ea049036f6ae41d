/// quick start - register a borrower and record a payment
use lending_ledger::{Ledger, Money, NewBorrower, NewPayment, PaymentMonth, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let ledger = Ledger::builder().build()?;

    // a 10,000 loan at 2% a month
    let borrower = ledger.register_borrower(NewBorrower::new(
        "Asha Rao",
        "9876500000",
        "Pune",
        Money::from_major(10_000),
        Rate::from_percentage(2),
    ))?;
    println!("registered account {}", borrower.account_number);

    let suggested = ledger.suggested_payment(&borrower.account_number)?;
    ledger.record_payment(NewPayment::new(
        borrower.account_number.clone(),
        suggested,
        PaymentMonth::parse("2024-01")?,
    ))?;

    let borrower = ledger.borrower(&borrower.account_number)?;
    println!("total interest paid: {}", borrower.total_interest_paid.to_currency_string());

    Ok(())
}
