use thiserror::Error;

use crate::decimal::Money;
use crate::types::InstrumentId;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("payment exceeds outstanding balance: balance {balance}, requested {requested}")]
    PaymentExceedsBalance {
        balance: Money,
        requested: Money,
    },

    #[error("invalid installment count: requested {requested}, remaining {remaining}")]
    InvalidInstallmentCount {
        requested: u32,
        remaining: u32,
    },

    #[error("missing required field: {field}")]
    MissingRequiredField {
        field: &'static str,
    },

    #[error("invalid due day: {day} (expected 1-31)")]
    InvalidDueDay {
        day: u8,
    },

    #[error("instrument not found: {id}")]
    InstrumentNotFound {
        id: InstrumentId,
    },

    #[error("payment record not found: {id}")]
    PaymentRecordNotFound {
        id: Uuid,
    },

    #[error("operation not supported for {kind} instruments")]
    OperationNotSupported {
        kind: crate::types::InstrumentKind,
    },

    #[error("instrument has no due date")]
    MissingDueDate,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
