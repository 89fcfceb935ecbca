/// history rewrite - edit and delete past payments, watch the state reconcile
use debt_ledger_rs::{
    export, Ledger, MemoryStore, Money, NewCard, PaymentStatus, SafeTimeProvider, TimeSource,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== history rewrite ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    ));
    let today = time.now().date_naive();

    let mut ledger = Ledger::empty(MemoryStore::new());
    let card = ledger.add_credit_card(NewCard {
        issuer: "Garanti".to_string(),
        display_name: "Bonus Card".to_string(),
        credit_limit: Money::from_major(20_000),
        current_balance: Money::from_major(1_000),
        due_day: 20,
        statement_day: None,
    }, &time)?;

    ledger.record_payment(card, Money::from_major(300), &time)?;
    ledger.record_payment(card, Money::from_major(200), &time)?;

    let card_ref = ledger.get(card).unwrap();
    println!("1. after two payments: balance = {}, paid = {}, status = {}",
        card_ref.current_balance, card_ref.paid_amount_total, card_ref.status);

    // inflate the newest record so the total covers the whole statement
    let record_id = card_ref.payment_history[0].id;
    let status = ledger.edit_payment_record(card, record_id, Money::from_major(700))?;
    println!("2. edited 200 -> 700: status = {status}");
    assert_eq!(status, PaymentStatus::FullyPaid);
    assert!(ledger.get(card).unwrap().current_balance.is_zero());

    // delete the same record and the debt comes back
    let status = ledger.delete_payment_record(card, record_id)?;
    let card_ref = ledger.get(card).unwrap();
    println!("3. deleted it again: balance = {}, status = {status}",
        card_ref.current_balance);
    assert_eq!(card_ref.current_balance, Money::from_major(700));

    // export what we ended up with
    println!("\n4. snapshot:\n{}", export::snapshot_json(ledger.instruments(), today)?);

    let reminder = export::calendar_reminder(ledger.get(card).unwrap(), time.now())?;
    println!("5. reminder ({} lines of iCalendar), save as {}",
        reminder.lines().count(),
        export::reminder_filename(ledger.get(card).unwrap()));

    Ok(())
}
