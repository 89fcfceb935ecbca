use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::reconcile;
use crate::schedule;
use crate::types::{DueClassification, InstrumentId, InstrumentKind, PaymentStatus};

/// one entry in an instrument's payment history, most recent first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    /// free-text label, e.g. "this month's statement"
    pub label: String,
    pub date: NaiveDate,
    pub amount: Money,
    pub status_label: String,
}

impl PaymentRecord {
    pub fn new(label: impl Into<String>, date: NaiveDate, amount: Money, status_label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            date,
            amount,
            status_label: status_label.into(),
        }
    }
}

/// a tracked card or loan record
///
/// loan-only fields are zero/absent for cards; the legacy `is_marked_paid`
/// flag is a compatibility projection of `status` and is rewritten on every
/// reconciliation, never read as an independent source of truth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub kind: InstrumentKind,
    pub issuer: String,
    pub display_name: String,
    /// zero for loans, positive for revolving cards
    pub credit_limit: Money,
    /// amount owed right now; clamped to zero on overpayment
    pub current_balance: Money,
    /// cards: derived from balance and limit; loans: the monthly installment
    pub minimum_due: Money,
    /// day-of-month (1-31) used to project the next due date
    pub due_day: u8,
    pub next_due_date: Option<NaiveDate>,
    pub statement_date: Option<NaiveDate>,
    /// cumulative amount paid, recomputed from the history after edits
    pub paid_amount_total: Money,
    pub status: PaymentStatus,
    /// legacy boolean from the prior status model; true iff `FullyPaid`
    pub is_marked_paid: bool,
    /// balance snapshot taken just before the most recent partial payment;
    /// present only while `status == PartialPaid`
    pub prior_balance: Option<Money>,
    #[serde(default)]
    pub monthly_installment: Money,
    /// historical field only; remaining installments are recomputed from
    /// `loan_end_date`, this is just the fallback when the end date is absent
    #[serde(default)]
    pub installment_count_at_creation: u32,
    pub loan_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_history: Vec<PaymentRecord>,
}

/// validated input for a new credit card
#[derive(Debug, Clone)]
pub struct NewCard {
    pub issuer: String,
    pub display_name: String,
    pub credit_limit: Money,
    pub current_balance: Money,
    pub due_day: u8,
    pub statement_day: Option<u8>,
}

/// validated input for a new installment loan
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub issuer: String,
    pub display_name: String,
    pub monthly_installment: Money,
    pub installment_count: u32,
    pub due_day: u8,
}

impl Instrument {
    /// create a credit card instrument
    pub fn credit_card(input: NewCard, today: NaiveDate) -> Result<Self> {
        if input.issuer.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField { field: "issuer" });
        }
        if !(1..=31).contains(&input.due_day) {
            return Err(LedgerError::InvalidDueDay { day: input.due_day });
        }

        let display_name = if input.display_name.trim().is_empty() {
            input.issuer.clone()
        } else {
            input.display_name
        };

        let balance = input.current_balance.max(Money::ZERO);

        Ok(Self {
            id: Uuid::new_v4(),
            kind: InstrumentKind::CreditCard,
            issuer: input.issuer,
            display_name,
            credit_limit: input.credit_limit,
            current_balance: balance,
            minimum_due: reconcile::minimum_due(balance, input.credit_limit),
            due_day: input.due_day,
            next_due_date: schedule::next_due_from_day(input.due_day, today),
            statement_date: input
                .statement_day
                .and_then(|d| schedule::next_due_from_day(d, today)),
            paid_amount_total: Money::ZERO,
            status: PaymentStatus::Pending,
            is_marked_paid: false,
            prior_balance: None,
            monthly_installment: Money::ZERO,
            installment_count_at_creation: 0,
            loan_end_date: None,
            payment_history: Vec::new(),
        })
    }

    /// create an installment loan instrument
    pub fn loan(input: NewLoan, today: NaiveDate) -> Result<Self> {
        if input.issuer.trim().is_empty() {
            return Err(LedgerError::MissingRequiredField { field: "issuer" });
        }
        if input.installment_count == 0 {
            return Err(LedgerError::MissingRequiredField { field: "installment_count" });
        }
        if !input.monthly_installment.is_positive() {
            return Err(LedgerError::MissingRequiredField { field: "monthly_installment" });
        }
        if !(1..=31).contains(&input.due_day) {
            return Err(LedgerError::InvalidDueDay { day: input.due_day });
        }

        let display_name = if input.display_name.trim().is_empty() {
            "My loan".to_string()
        } else {
            input.display_name
        };

        // end date: today + N months, pinned to the payment day
        let end = schedule::with_day_of_month(
            schedule::add_months(today, input.installment_count),
            input.due_day,
        );

        Ok(Self {
            id: Uuid::new_v4(),
            kind: InstrumentKind::Loan,
            issuer: input.issuer,
            display_name,
            credit_limit: Money::ZERO,
            current_balance: input.monthly_installment.times(input.installment_count),
            minimum_due: input.monthly_installment,
            due_day: input.due_day,
            next_due_date: schedule::next_due_from_day(input.due_day, today),
            statement_date: None,
            paid_amount_total: Money::ZERO,
            status: PaymentStatus::Pending,
            is_marked_paid: false,
            prior_balance: None,
            monthly_installment: input.monthly_installment,
            installment_count_at_creation: input.installment_count,
            loan_end_date: Some(end),
            payment_history: Vec::new(),
        })
    }

    pub fn is_card(&self) -> bool {
        self.kind == InstrumentKind::CreditCard
    }

    pub fn is_loan(&self) -> bool {
        self.kind == InstrumentKind::Loan
    }

    /// sum the history into `paid_amount_total`; always a full recomputation
    /// so the field stays exact after edits and deletes
    pub fn recompute_paid_total(&mut self) {
        self.paid_amount_total = self.payment_history.iter().map(|p| p.amount).sum();
    }

    /// dynamic remaining installment count (loans)
    pub fn remaining_installments(&self, today: NaiveDate) -> u32 {
        schedule::remaining_installments(
            self.loan_end_date,
            self.installment_count_at_creation,
            today,
        )
    }

    /// debt outstanding right now: the stored balance for cards, the dynamic
    /// installment arithmetic for loans
    pub fn remaining_balance(&self, today: NaiveDate) -> Money {
        match self.kind {
            InstrumentKind::CreditCard => self.current_balance,
            InstrumentKind::Loan => self
                .monthly_installment
                .times(self.remaining_installments(today)),
        }
    }

    /// nothing left to pay
    pub fn is_settled(&self, today: NaiveDate) -> bool {
        self.status == PaymentStatus::FullyPaid || !self.remaining_balance(today).is_positive()
    }

    /// signed days until the next due date
    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        schedule::days_left(self.next_due_date, today)
    }

    /// display band for the next due date; settled instruments always
    /// classify as paid
    pub fn due_classification(&self, today: NaiveDate) -> DueClassification {
        schedule::classify(self.days_left(today), self.is_settled(today))
    }
}
