use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::instrument::{Instrument, NewCard, NewLoan};
use crate::reconcile;
use crate::seed;
use crate::store::{self, StateStore};
use crate::types::{InstrumentId, PaymentStatus};

/// aggregate totals for the dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_paid: Money,
    pub remaining_debt: Money,
    pub grand_total: Money,
    /// rounded share of the grand total already paid, 0-100
    pub percent_paid: u32,
}

/// owner of the instrument collection
///
/// every operation takes an instrument id and an explicit clock, mutates the
/// in-memory collection, and then persists the entire collection, never a
/// single instrument in isolation; there is exactly one logical writer and
/// operations run to completion before the next one starts
pub struct Ledger<S: StateStore> {
    instruments: Vec<Instrument>,
    store: S,
    events: EventStore,
}

impl<S: StateStore> Ledger<S> {
    /// load the full collection from the store
    ///
    /// load problems are never fatal: a missing blob seeds the starter
    /// dataset, and a corrupt one is logged and replaced by it
    pub fn open(store: S, time: &SafeTimeProvider) -> Self {
        let today = time.now().date_naive();

        let instruments = match store.load() {
            Ok(Some(blob)) => match store::decode_collection(&blob, today) {
                Ok(instruments) => instruments,
                Err(error) => {
                    warn!(%error, "persisted ledger is corrupt, falling back to starter dataset");
                    seed::default_instruments(today)
                }
            },
            Ok(None) => {
                debug!("no persisted ledger found, seeding starter dataset");
                seed::default_instruments(today)
            }
            Err(error) => {
                warn!(%error, "could not read persisted ledger, falling back to starter dataset");
                seed::default_instruments(today)
            }
        };

        Self {
            instruments,
            store,
            events: EventStore::new(),
        }
    }

    /// open with an empty collection instead of the starter dataset
    pub fn empty(store: S) -> Self {
        Self {
            instruments: Vec::new(),
            store,
            events: EventStore::new(),
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn get(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.id == id)
    }

    /// instruments with debt still outstanding
    pub fn active(&self, today: NaiveDate) -> Vec<&Instrument> {
        self.instruments
            .iter()
            .filter(|i| i.remaining_balance(today).is_positive())
            .collect()
    }

    /// instruments that completed a payment this cycle or are settled
    pub fn completed(&self, today: NaiveDate) -> Vec<&Instrument> {
        self.instruments
            .iter()
            .filter(|i| i.status.is_paid_this_cycle() || i.is_settled(today))
            .collect()
    }

    /// drain the events collected since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// add a validated credit card and persist
    pub fn add_credit_card(&mut self, input: NewCard, time: &SafeTimeProvider) -> Result<InstrumentId> {
        let today = time.now().date_naive();
        let card = Instrument::credit_card(input, today)?;
        let id = card.id;

        self.events.emit(Event::InstrumentAdded {
            instrument_id: id,
            kind: card.kind,
            display_name: card.display_name.clone(),
        });
        self.instruments.push(card);
        self.persist()?;

        debug!(instrument_id = %id, "credit card added");
        Ok(id)
    }

    /// add a validated loan and persist
    pub fn add_loan(&mut self, input: NewLoan, time: &SafeTimeProvider) -> Result<InstrumentId> {
        let today = time.now().date_naive();
        let loan = Instrument::loan(input, today)?;
        let id = loan.id;

        self.events.emit(Event::InstrumentAdded {
            instrument_id: id,
            kind: loan.kind,
            display_name: loan.display_name.clone(),
        });
        self.instruments.push(loan);
        self.persist()?;

        debug!(instrument_id = %id, "loan added");
        Ok(id)
    }

    /// delete an instrument and persist
    pub fn remove(&mut self, id: InstrumentId) -> Result<Instrument> {
        let index = self
            .instruments
            .iter()
            .position(|i| i.id == id)
            .ok_or(LedgerError::InstrumentNotFound { id })?;

        let removed = self.instruments.remove(index);
        self.events.emit(Event::InstrumentRemoved { instrument_id: id });
        self.persist()?;

        Ok(removed)
    }

    /// apply a direct payment to a card
    pub fn record_payment(
        &mut self,
        id: InstrumentId,
        amount: Money,
        time: &SafeTimeProvider,
    ) -> Result<PaymentStatus> {
        let today = time.now().date_naive();
        self.with_reconciled(id, |instrument| {
            reconcile::apply_payment(instrument, amount, today)
        })
    }

    /// quick action: pay the minimum due on a card
    pub fn pay_minimum(&mut self, id: InstrumentId, time: &SafeTimeProvider) -> Result<PaymentStatus> {
        let today = time.now().date_naive();
        self.with_reconciled(id, |instrument| reconcile::pay_minimum(instrument, today))
    }

    /// quick action: settle the full outstanding debt
    pub fn mark_fully_paid(&mut self, id: InstrumentId, time: &SafeTimeProvider) -> Result<PaymentStatus> {
        let today = time.now().date_naive();
        self.with_reconciled(id, |instrument| reconcile::mark_fully_paid(instrument, today))
    }

    /// pay a whole number of loan installments
    pub fn pay_installments(
        &mut self,
        id: InstrumentId,
        count: u32,
        time: &SafeTimeProvider,
    ) -> Result<PaymentStatus> {
        let today = time.now().date_naive();
        self.with_reconciled(id, |instrument| {
            reconcile::pay_installments(instrument, count, today)
        })
    }

    /// change the amount of a historical payment record and re-reconcile
    pub fn edit_payment_record(
        &mut self,
        id: InstrumentId,
        record_id: Uuid,
        new_amount: Money,
    ) -> Result<PaymentStatus> {
        if !new_amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount { amount: new_amount });
        }

        let instrument = self.instrument_mut(id)?;
        let record = instrument
            .payment_history
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or(LedgerError::PaymentRecordNotFound { id: record_id })?;

        let old_amount = record.amount;
        record.amount = new_amount;

        let old_status = instrument.status;
        let balance_before = instrument.current_balance;
        let old_paid_total = instrument.paid_amount_total;
        let status = reconcile::reconcile_after_history_change(instrument, balance_before, old_paid_total);

        self.events.emit(Event::PaymentHistoryEdited {
            instrument_id: id,
            record_id,
            old_amount,
            new_amount,
        });
        self.emit_status_change(id, old_status, status);
        self.persist()?;

        Ok(status)
    }

    /// delete a historical payment record and re-reconcile
    pub fn delete_payment_record(&mut self, id: InstrumentId, record_id: Uuid) -> Result<PaymentStatus> {
        let instrument = self.instrument_mut(id)?;
        let index = instrument
            .payment_history
            .iter()
            .position(|r| r.id == record_id)
            .ok_or(LedgerError::PaymentRecordNotFound { id: record_id })?;

        let removed = instrument.payment_history.remove(index);

        let old_status = instrument.status;
        let balance_before = instrument.current_balance;
        let old_paid_total = instrument.paid_amount_total;
        let status = reconcile::reconcile_after_history_change(instrument, balance_before, old_paid_total);

        self.events.emit(Event::PaymentHistoryDeleted {
            instrument_id: id,
            record_id,
            amount: removed.amount,
        });
        self.emit_status_change(id, old_status, status);
        self.persist()?;

        Ok(status)
    }

    /// aggregate totals across the whole collection
    pub fn summary(&self, today: NaiveDate) -> LedgerSummary {
        let total_paid: Money = self.instruments.iter().map(|i| i.paid_amount_total).sum();
        let remaining_debt: Money = self
            .instruments
            .iter()
            .map(|i| i.remaining_balance(today))
            .sum();
        let grand_total = total_paid + remaining_debt;

        let percent_paid = if grand_total.is_positive() {
            (total_paid.as_decimal() / grand_total.as_decimal() * Decimal::from(100))
                .round()
                .to_u32()
                .unwrap_or(0)
        } else {
            0
        };

        LedgerSummary {
            total_paid,
            remaining_debt,
            grand_total,
            percent_paid,
        }
    }

    fn instrument_mut(&mut self, id: InstrumentId) -> Result<&mut Instrument> {
        self.instruments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(LedgerError::InstrumentNotFound { id })
    }

    /// run a payment operation, emit the bookkeeping events, persist
    fn with_reconciled<F>(&mut self, id: InstrumentId, op: F) -> Result<PaymentStatus>
    where
        F: FnOnce(&mut Instrument) -> Result<PaymentStatus>,
    {
        let instrument = self.instrument_mut(id)?;
        let old_status = instrument.status;
        let history_len_before = instrument.payment_history.len();

        let status = op(instrument)?;

        // newest record sits at the front of the history; only emit when the
        // operation actually appended one (settling an already-settled
        // instrument records nothing)
        let appended = instrument.payment_history.len() > history_len_before;
        let latest = instrument.payment_history.first().map(|r| (r.amount, r.date));
        let new_balance = instrument.current_balance;

        if let Some((amount, date)) = latest.filter(|_| appended) {
            self.events.emit(Event::PaymentRecorded {
                instrument_id: id,
                amount,
                new_balance,
                date,
            });
        }
        self.emit_status_change(id, old_status, status);
        self.persist()?;

        debug!(instrument_id = %id, new_status = %status, "payment applied");
        Ok(status)
    }

    fn emit_status_change(&mut self, id: InstrumentId, old: PaymentStatus, new: PaymentStatus) {
        if old != new {
            self.events.emit(Event::StatusChanged {
                instrument_id: id,
                old_status: old,
                new_status: new,
            });
        }
    }

    /// write the whole collection back to the store
    fn persist(&self) -> Result<()> {
        let blob = store::encode_collection(&self.instruments)?;
        self.store.save(&blob)
    }
}
