/// payment flows - custom amounts, minimum payments, installments, full payoff
use debt_ledger_rs::{
    Ledger, MemoryStore, Money, NewCard, NewLoan, PaymentStatus, SafeTimeProvider, TimeSource,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("=== payment flows ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    ));
    let today = time.now().date_naive();

    let mut ledger = Ledger::empty(MemoryStore::new());

    let card = ledger.add_credit_card(NewCard {
        issuer: "Akbank".to_string(),
        display_name: "Axess".to_string(),
        credit_limit: Money::from_major(10_000),
        current_balance: Money::from_major(1_000),
        due_day: 25,
        statement_day: None,
    }, &time)?;

    // a custom payment above the minimum but below the balance
    let status = ledger.record_payment(card, Money::from_major(500), &time)?;
    println!("1. paid 500 of 1000: status = {status}");
    assert_eq!(status, PaymentStatus::PartialPaid);

    let card_ref = ledger.get(card).unwrap();
    println!("   balance = {}, new minimum = {}",
        card_ref.current_balance, card_ref.minimum_due);

    // top up to the full balance
    let status = ledger.record_payment(card, Money::from_major(500), &time)?;
    println!("2. paid the rest: status = {status}");
    assert_eq!(status, PaymentStatus::FullyPaid);
    assert!(ledger.get(card).unwrap().current_balance.is_zero());

    // minimum payment quick action on a second card
    let card2 = ledger.add_credit_card(NewCard {
        issuer: "Yapı Kredi".to_string(),
        display_name: "World Card".to_string(),
        credit_limit: Money::from_major(60_000),
        current_balance: Money::from_major(2_000),
        due_day: 10,
        statement_day: None,
    }, &time)?;
    // high-limit card, so the minimum is the 40% band
    println!("3. high-limit minimum = {}", ledger.get(card2).unwrap().minimum_due);
    let status = ledger.pay_minimum(card2, &time)?;
    println!("   after minimum payment: status = {status}");

    // loan installments, one at a time and in bulk
    let loan = ledger.add_loan(NewLoan {
        issuer: "Ziraat".to_string(),
        display_name: "Car loan".to_string(),
        monthly_installment: Money::from_major(3_000),
        installment_count: 6,
        due_day: 5,
    }, &time)?;

    ledger.pay_installments(loan, 1, &time)?;
    let loan_ref = ledger.get(loan).unwrap();
    println!("4. one installment paid: {} left, next due {:?}",
        loan_ref.remaining_installments(today), loan_ref.next_due_date);

    let status = ledger.pay_installments(loan, 5, &time)?;
    println!("5. remaining five paid: status = {status}");
    assert_eq!(status, PaymentStatus::FullyPaid);

    // rejected operations leave state untouched
    let err = ledger.record_payment(card, Money::from_major(99_999), &time);
    println!("6. overpayment rejected: {}", err.unwrap_err());

    for event in ledger.take_events() {
        println!("   event: {event:?}");
    }

    Ok(())
}
