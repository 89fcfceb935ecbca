use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{InstrumentId, InstrumentKind, PaymentStatus};

/// all events that can be emitted by ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    InstrumentAdded {
        instrument_id: InstrumentId,
        kind: InstrumentKind,
        display_name: String,
    },
    InstrumentRemoved {
        instrument_id: InstrumentId,
    },
    PaymentRecorded {
        instrument_id: InstrumentId,
        amount: Money,
        new_balance: Money,
        date: NaiveDate,
    },
    PaymentHistoryEdited {
        instrument_id: InstrumentId,
        record_id: Uuid,
        old_amount: Money,
        new_amount: Money,
    },
    PaymentHistoryDeleted {
        instrument_id: InstrumentId,
        record_id: Uuid,
        amount: Money,
    },
    StatusChanged {
        instrument_id: InstrumentId,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
