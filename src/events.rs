use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ContractId, ContractStatus, InstallmentId, PaymentId};

/// all events that can be emitted by the ledger engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // schedule events
    ScheduleGenerated {
        contract_id: ContractId,
        installments: u32,
        first_due: NaiveDate,
    },

    // payment events
    PaymentReceived {
        contract_id: ContractId,
        payment_id: PaymentId,
        amount: Money,
        consumed: Money,
        leftover: Money,
        date: NaiveDate,
    },
    PaymentRemoved {
        contract_id: ContractId,
        payment_id: PaymentId,
        amount: Money,
    },
    InstallmentSettled {
        contract_id: ContractId,
        installment_id: InstallmentId,
        sequence: u32,
        date: NaiveDate,
    },

    // arrears events
    LateFeeAssessed {
        contract_id: ContractId,
        installment_id: InstallmentId,
        sequence: u32,
        fee: Money,
        days_late: u32,
    },
    ArrearsFlagChanged {
        contract_id: ContractId,
        in_arrears: bool,
    },
    ExemptionToggled {
        contract_id: ContractId,
        installment_id: InstallmentId,
        fee_exempt: bool,
    },

    // manual correction events
    InstallmentAdjusted {
        contract_id: ContractId,
        installment_id: InstallmentId,
        sequence: u32,
        previous_paid: Money,
        new_paid: Money,
    },
    LedgerRecalculated {
        contract_id: ContractId,
        payments_replayed: u32,
    },

    // lifecycle events
    ContractStatusChanged {
        contract_id: ContractId,
        old_status: ContractStatus,
        new_status: ContractStatus,
        date: NaiveDate,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
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
