//! persistence: the whole instrument collection is one serialized blob under
//! a single key, loaded once at startup and rewritten after every mutation
//!
//! loading is deliberately lenient: legacy blobs carry free-text localized
//! dates, ad-hoc ids, and the old boolean paid flag, and all of them are
//! migrated on the way in; a blob that cannot be decoded at all is reported
//! as an error so the caller can fall back to the starter dataset

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::Result;
use crate::instrument::{Instrument, PaymentRecord};
use crate::schedule;
use crate::types::{InstrumentKind, PaymentStatus};

/// blob-level storage seam; the engine never sees where the bytes live
pub trait StateStore {
    /// read the persisted blob, `None` on first run
    fn load(&self) -> Result<Option<String>>;
    /// replace the persisted blob
    fn save(&self, blob: &str) -> Result<()>;
}

/// single-file JSON store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn save(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// in-memory store for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&self, blob: &str) -> Result<()> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}

/// serialize the full collection
pub fn encode_collection(instruments: &[Instrument]) -> Result<String> {
    Ok(serde_json::to_string_pretty(instruments)?)
}

/// parse a persisted blob, migrating legacy field shapes as we go
pub fn decode_collection(blob: &str, today: NaiveDate) -> Result<Vec<Instrument>> {
    let raw: Vec<RawInstrument> = serde_json::from_str(blob)?;
    Ok(raw.into_iter().map(|r| r.migrate(today)).collect())
}

fn default_kind() -> InstrumentKind {
    InstrumentKind::CreditCard
}

fn default_due_day() -> u8 {
    1
}

/// lenient mirror of [`Instrument`] for loading: money may arrive as number
/// or string, dates as strict or legacy localized text, ids as anything
#[derive(Debug, Deserialize)]
struct RawInstrument {
    #[serde(default)]
    id: Value,
    #[serde(default = "default_kind")]
    kind: InstrumentKind,
    #[serde(default)]
    issuer: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    credit_limit: Value,
    #[serde(default)]
    current_balance: Value,
    #[serde(default)]
    minimum_due: Value,
    #[serde(default = "default_due_day")]
    due_day: u8,
    #[serde(default)]
    next_due_date: Value,
    #[serde(default)]
    statement_date: Value,
    #[serde(default)]
    paid_amount_total: Value,
    #[serde(default)]
    status: Option<PaymentStatus>,
    #[serde(default)]
    is_marked_paid: bool,
    #[serde(default)]
    prior_balance: Value,
    #[serde(default)]
    monthly_installment: Value,
    #[serde(default)]
    installment_count_at_creation: u32,
    #[serde(default)]
    loan_end_date: Value,
    #[serde(default)]
    payment_history: Vec<RawPaymentRecord>,
}

#[derive(Debug, Deserialize)]
struct RawPaymentRecord {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    label: String,
    #[serde(default)]
    date: Value,
    #[serde(default)]
    amount: Value,
    #[serde(default)]
    status_label: String,
}

impl RawInstrument {
    fn migrate(self, today: NaiveDate) -> Instrument {
        let history: Vec<PaymentRecord> = self
            .payment_history
            .into_iter()
            .map(|r| PaymentRecord {
                id: id_value(&r.id),
                label: r.label,
                date: date_value(&r.date, today).unwrap_or(today),
                amount: money_value(&r.amount),
                status_label: r.status_label,
            })
            .collect();

        // the old status model tracked a lone boolean; lift it into the
        // tagged status so the flag never acts as a second source of truth
        let mut status = self.status.unwrap_or_default();
        if self.is_marked_paid && status == PaymentStatus::Pending {
            status = PaymentStatus::FullyPaid;
        }

        let paid_amount_total = match opt_money(&self.paid_amount_total) {
            Some(total) => total,
            None => history.iter().map(|p| p.amount).sum(),
        };

        let prior_balance = if status == PaymentStatus::PartialPaid {
            opt_money(&self.prior_balance)
        } else {
            None
        };

        Instrument {
            id: id_value(&self.id),
            kind: self.kind,
            issuer: self.issuer,
            display_name: self.display_name,
            credit_limit: money_value(&self.credit_limit),
            current_balance: money_value(&self.current_balance).max(Money::ZERO),
            minimum_due: money_value(&self.minimum_due),
            due_day: self.due_day,
            next_due_date: date_value(&self.next_due_date, today),
            statement_date: date_value(&self.statement_date, today),
            paid_amount_total,
            status,
            is_marked_paid: status == PaymentStatus::FullyPaid,
            prior_balance,
            monthly_installment: money_value(&self.monthly_installment),
            installment_count_at_creation: self.installment_count_at_creation,
            loan_end_date: date_value(&self.loan_end_date, today),
            payment_history: history,
        }
    }
}

fn money_value(value: &Value) -> Money {
    match value {
        Value::Number(n) => Money::from_str_exact(&n.to_string()).unwrap_or(Money::ZERO),
        Value::String(s) => Money::from_str_exact(s).unwrap_or(Money::ZERO),
        _ => Money::ZERO,
    }
}

fn opt_money(value: &Value) -> Option<Money> {
    match value {
        Value::Null => None,
        other => Some(money_value(other)),
    }
}

fn date_value(value: &Value, today: NaiveDate) -> Option<NaiveDate> {
    match value {
        Value::String(s) => schedule::parse_flexible_date(s, today),
        _ => None,
    }
}

fn id_value(value: &Value) -> Uuid {
    match value {
        Value::String(s) => Uuid::parse_str(s).unwrap_or_else(|_| Uuid::new_v4()),
        _ => Uuid::new_v4(),
    }
}
