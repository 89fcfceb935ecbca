/// quick start - open a ledger, add a card and a loan, look at the summary
use debt_ledger_rs::{Ledger, MemoryStore, Money, NewCard, NewLoan, SafeTimeProvider, TimeSource};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quick start ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    ));
    let today = time.now().date_naive();

    // a fresh store seeds the built-in starter dataset
    let mut ledger = Ledger::open(MemoryStore::new(), &time);
    println!("1. seeded with {} instruments", ledger.instruments().len());

    let card = ledger.add_credit_card(NewCard {
        issuer: "Garanti".to_string(),
        display_name: "Bonus Card".to_string(),
        credit_limit: Money::from_major(20_000),
        current_balance: Money::from_major(5_000),
        due_day: 20,
        statement_day: Some(10),
    }, &time)?;

    let loan = ledger.add_loan(NewLoan {
        issuer: "Ziraat".to_string(),
        display_name: "Car loan".to_string(),
        monthly_installment: Money::from_major(3_000),
        installment_count: 12,
        due_day: 5,
    }, &time)?;

    let card_ref = ledger.get(card).unwrap();
    println!("2. card: minimum due = {}, next due = {:?}",
        card_ref.minimum_due, card_ref.next_due_date);

    let loan_ref = ledger.get(loan).unwrap();
    println!("3. loan: {} installments left, ends {:?}",
        loan_ref.remaining_installments(today), loan_ref.loan_end_date);

    let summary = ledger.summary(today);
    println!("4. totals: paid = {}, remaining = {}, {}% done",
        summary.total_paid, summary.remaining_debt, summary.percent_paid);

    Ok(())
}
