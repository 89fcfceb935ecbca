pub mod decimal;
pub mod errors;
pub mod events;
pub mod export;
pub mod instrument;
pub mod ledger;
pub mod reconcile;
pub mod schedule;
pub mod seed;
pub mod store;
pub mod types;

// re-export key types
pub use decimal::Money;
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use export::ExportRow;
pub use instrument::{Instrument, NewCard, NewLoan, PaymentRecord};
pub use ledger::{Ledger, LedgerSummary};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use types::{
    DueClassification, InstrumentId, InstrumentKind, PaymentStatus, Urgency,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
