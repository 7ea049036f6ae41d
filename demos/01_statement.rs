/// statement - a few months of payments under controlled time
use chrono::{Duration, TimeZone, Utc};
use lending_ledger::{
    Ledger, Money, NewBorrower, NewPayment, PaymentMonth, PaymentUpdate, Rate, SafeTimeProvider,
    TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()
    ));
    let ledger = Ledger::builder().time(time).build()?;
    let control = ledger.clock().test_control().unwrap();

    let borrower = ledger.register_borrower(NewBorrower::new(
        "Ravi Kumar",
        "9000000001",
        "Nagpur",
        Money::from_major(12_345),
        Rate::from_percent(dec!(1.5)),
    ))?;
    let account = borrower.account_number.clone();

    let mut first = None;
    for month in ["2024-01", "2024-02", "2024-03"] {
        let payment = ledger.record_payment(NewPayment::new(
            account.clone(),
            ledger.suggested_payment(&account)?,
            PaymentMonth::parse(month)?,
        ))?;
        first.get_or_insert(payment.id);
        control.advance(Duration::days(30));
    }

    // the january payment was short
    if let Some(id) = first {
        ledger.update_payment(id, PaymentUpdate::default().amount(Money::from_major(100)))?;
    }

    let view = ledger.statement_view(&account)?;
    println!("{}", view.to_json_pretty()?);

    for row in ledger.list_payments()? {
        println!("{} {} {}", row.name, row.payment.payment_month, row.payment.payment_amount);
    }

    Ok(())
}
