//! read-only projections out of the ledger: flat snapshot rows for
//! spreadsheet-style export, and an iCalendar reminder for a due date

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::instrument::Instrument;
use crate::types::{InstrumentKind, PaymentStatus};

/// one instrument flattened into a snapshot row; loan-only columns are
/// `None` for cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub kind: InstrumentKind,
    pub issuer: String,
    pub display_name: String,
    pub credit_limit: Money,
    pub current_balance: Money,
    pub remaining_balance: Money,
    pub minimum_due: Money,
    pub paid_amount_total: Money,
    pub next_due_date: Option<NaiveDate>,
    pub statement_date: Option<NaiveDate>,
    pub status: String,
    pub remaining_installments: Option<u32>,
    pub monthly_installment: Option<Money>,
    pub loan_end_date: Option<NaiveDate>,
}

/// project the whole collection into export rows
pub fn snapshot_rows(instruments: &[Instrument], today: NaiveDate) -> Vec<ExportRow> {
    instruments
        .iter()
        .map(|instrument| ExportRow {
            kind: instrument.kind,
            issuer: instrument.issuer.clone(),
            display_name: instrument.display_name.clone(),
            credit_limit: instrument.credit_limit,
            current_balance: instrument.current_balance,
            remaining_balance: instrument.remaining_balance(today),
            minimum_due: instrument.minimum_due,
            paid_amount_total: instrument.paid_amount_total,
            next_due_date: instrument.next_due_date,
            statement_date: instrument.statement_date,
            status: instrument.status.to_string(),
            remaining_installments: instrument
                .is_loan()
                .then(|| instrument.remaining_installments(today)),
            monthly_installment: instrument.is_loan().then_some(instrument.monthly_installment),
            loan_end_date: instrument.loan_end_date,
        })
        .collect()
}

/// serialize the snapshot rows as a pretty JSON document
pub fn snapshot_json(instruments: &[Instrument], today: NaiveDate) -> Result<String> {
    Ok(serde_json::to_string_pretty(&snapshot_rows(instruments, today))?)
}

/// build an all-day iCalendar event for the instrument's next due date,
/// with reminders the day before and on the day itself
pub fn calendar_reminder(instrument: &Instrument, now: DateTime<Utc>) -> Result<String> {
    let due = instrument.next_due_date.ok_or(LedgerError::MissingDueDate)?;

    let amount = if instrument.kind == InstrumentKind::Loan {
        instrument.monthly_installment
    } else if instrument.minimum_due.is_positive()
        && instrument.status != PaymentStatus::FullyPaid
    {
        instrument.minimum_due
    } else {
        instrument.current_balance
    };

    let date_stamp = due.format("%Y%m%d");
    let lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//debt-ledger//payment reminders//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@debt-ledger", Uuid::new_v4()),
        format!("DTSTAMP:{}", now.format("%Y%m%dT%H%M%SZ")),
        format!("DTSTART;VALUE=DATE:{date_stamp}"),
        format!("DTEND;VALUE=DATE:{date_stamp}"),
        format!("SUMMARY:{} payment", instrument.display_name),
        format!("DESCRIPTION:Amount due: {amount}"),
        "BEGIN:VALARM".to_string(),
        "TRIGGER:-P1D".to_string(),
        "ACTION:DISPLAY".to_string(),
        format!("DESCRIPTION:{} payment is due tomorrow", instrument.display_name),
        "END:VALARM".to_string(),
        "BEGIN:VALARM".to_string(),
        "TRIGGER:PT0M".to_string(),
        "ACTION:DISPLAY".to_string(),
        format!("DESCRIPTION:{} payment is due today", instrument.display_name),
        "END:VALARM".to_string(),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    Ok(lines.join("\r\n"))
}

/// filename suggestion for a saved reminder, derived from the display name
pub fn reminder_filename(instrument: &Instrument) -> String {
    let slug: String = instrument
        .display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}-payment.ics", slug.trim_matches('-'))
}
