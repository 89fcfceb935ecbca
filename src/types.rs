use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a tracked instrument
pub type InstrumentId = Uuid;

/// kind of debt instrument, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    CreditCard,
    Loan,
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentKind::CreditCard => write!(f, "credit card"),
            InstrumentKind::Loan => write!(f, "loan"),
        }
    }
}

/// payment status of an instrument, re-derived from scratch after every
/// mutation; exactly one variant holds at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// nothing meaningful paid this cycle
    #[default]
    Pending,
    /// remaining balance cleared, or explicitly marked paid
    FullyPaid,
    /// paid within tolerance of the minimum due (cards only)
    MinimumPaid,
    /// paid more than the minimum but debt remains (cards only)
    PartialPaid,
    /// at least one full installment covered this cycle (loans only)
    InstallmentPaid,
}

impl PaymentStatus {
    /// true for every variant that counts as a completed payment this cycle
    pub fn is_paid_this_cycle(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::FullyPaid => write!(f, "fully paid"),
            PaymentStatus::MinimumPaid => write!(f, "minimum paid"),
            PaymentStatus::PartialPaid => write!(f, "partially paid"),
            PaymentStatus::InstallmentPaid => write!(f, "installment paid"),
        }
    }
}

/// display urgency for a due-date classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Danger,
    Warning,
    Normal,
    Unknown,
    Paid,
}

/// band classification of a signed days-left count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DueClassification {
    /// instrument already paid this cycle; overrides every band
    Paid,
    /// due date passed, `days` whole days ago
    Overdue { days: i64 },
    DueToday,
    DueTomorrow,
    DueIn { days: i64 },
    /// absent or unparseable due date
    Unknown,
}

impl DueClassification {
    pub fn urgency(&self) -> Urgency {
        match self {
            DueClassification::Paid => Urgency::Paid,
            DueClassification::Overdue { .. } | DueClassification::DueToday => Urgency::Danger,
            DueClassification::DueTomorrow => Urgency::Warning,
            DueClassification::DueIn { .. } => Urgency::Normal,
            DueClassification::Unknown => Urgency::Unknown,
        }
    }
}
