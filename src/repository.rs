use std::collections::HashMap;

use crate::errors::{LedgerError, Result};
use crate::model::{Contract, Installment, Payment};
use crate::types::{ContractId, InstallmentId, PaymentId};

/// storage abstraction over contracts, installments and payments.
///
/// every read hands back a fresh copy of the record, so the engine never
/// works against a stale in-memory cache; every mutating engine operation
/// is expected to run inside one transaction owned by the implementation.
pub trait LedgerStore {
    fn contract(&self, id: ContractId) -> Result<Contract>;
    fn put_contract(&mut self, contract: Contract);

    /// installments of a contract ordered by sequence number
    fn installments(&self, contract_id: ContractId) -> Vec<Installment>;
    fn installment(&self, id: InstallmentId) -> Result<Installment>;
    fn put_installment(&mut self, installment: Installment);
    /// drop the contract's current schedule and store a new one
    fn replace_installments(&mut self, contract_id: ContractId, installments: Vec<Installment>);
    fn remove_installment(&mut self, id: InstallmentId) -> Result<Installment>;

    /// persist a new payment, assigning its ledger sequence
    fn insert_payment(&mut self, payment: Payment) -> Payment;
    fn payment(&self, id: PaymentId) -> Result<Payment>;
    fn put_payment(&mut self, payment: Payment);
    /// payments of a contract ordered by (date, ledger sequence)
    fn payments(&self, contract_id: ContractId) -> Vec<Payment>;
    fn remove_payment(&mut self, id: PaymentId) -> Result<Payment>;
}

/// in-memory reference store, used by the tests and by callers that keep
/// the ledger hydrated from elsewhere
#[derive(Debug, Default)]
pub struct MemoryLedger {
    contracts: HashMap<ContractId, Contract>,
    installments: HashMap<InstallmentId, Installment>,
    payments: HashMap<PaymentId, Payment>,
    next_sequence: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedger {
    fn contract(&self, id: ContractId) -> Result<Contract> {
        self.contracts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::ContractNotFound { id })
    }

    fn put_contract(&mut self, contract: Contract) {
        self.contracts.insert(contract.id, contract);
    }

    fn installments(&self, contract_id: ContractId) -> Vec<Installment> {
        let mut items: Vec<Installment> = self
            .installments
            .values()
            .filter(|i| i.contract_id == contract_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sequence);
        items
    }

    fn installment(&self, id: InstallmentId) -> Result<Installment> {
        self.installments
            .get(&id)
            .cloned()
            .ok_or(LedgerError::InstallmentNotFound { id })
    }

    fn put_installment(&mut self, installment: Installment) {
        self.installments.insert(installment.id, installment);
    }

    fn replace_installments(&mut self, contract_id: ContractId, installments: Vec<Installment>) {
        self.installments.retain(|_, i| i.contract_id != contract_id);
        for installment in installments {
            self.installments.insert(installment.id, installment);
        }
    }

    fn remove_installment(&mut self, id: InstallmentId) -> Result<Installment> {
        self.installments
            .remove(&id)
            .ok_or(LedgerError::InstallmentNotFound { id })
    }

    fn insert_payment(&mut self, mut payment: Payment) -> Payment {
        self.next_sequence += 1;
        payment.sequence = self.next_sequence;
        self.payments.insert(payment.id, payment.clone());
        payment
    }

    fn payment(&self, id: PaymentId) -> Result<Payment> {
        self.payments
            .get(&id)
            .cloned()
            .ok_or(LedgerError::PaymentNotFound { id })
    }

    fn put_payment(&mut self, payment: Payment) {
        self.payments.insert(payment.id, payment);
    }

    fn payments(&self, contract_id: ContractId) -> Vec<Payment> {
        let mut items: Vec<Payment> = self
            .payments
            .values()
            .filter(|p| p.contract_id == contract_id)
            .cloned()
            .collect();
        items.sort_by_key(|p| (p.date, p.sequence));
        items
    }

    fn remove_payment(&mut self, id: PaymentId) -> Result<Payment> {
        self.payments
            .remove(&id)
            .ok_or(LedgerError::PaymentNotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::types::PaymentMethod;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_payments_ordered_by_date_then_insertion() {
        let mut store = MemoryLedger::new();
        let contract = Contract::new(Money::from_major(1_000), Money::ZERO, 10, date(2024, 1, 1));
        let contract_id = contract.id;
        store.put_contract(contract);

        // inserted out of date order, same-day pair keeps insertion order
        let later = store.insert_payment(Payment::new(
            contract_id,
            date(2024, 3, 5),
            Money::from_major(100),
            PaymentMethod::Cash,
            None,
            "clerk",
        ));
        let early_a = store.insert_payment(Payment::new(
            contract_id,
            date(2024, 2, 5),
            Money::from_major(100),
            PaymentMethod::Cash,
            None,
            "clerk",
        ));
        let early_b = store.insert_payment(Payment::new(
            contract_id,
            date(2024, 2, 5),
            Money::from_major(50),
            PaymentMethod::Cash,
            None,
            "clerk",
        ));

        let ordered = store.payments(contract_id);
        assert_eq!(
            ordered.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![early_a.id, early_b.id, later.id]
        );
        assert!(early_a.sequence < early_b.sequence);
    }

    #[test]
    fn test_replace_installments_scoped_to_contract() {
        let mut store = MemoryLedger::new();
        let a = Contract::new(Money::from_major(600), Money::ZERO, 3, date(2024, 1, 1));
        let b = Contract::new(Money::from_major(900), Money::ZERO, 3, date(2024, 1, 1));
        let (a_id, b_id) = (a.id, b.id);
        store.put_contract(a);
        store.put_contract(b);

        store.replace_installments(
            a_id,
            vec![Installment::new(a_id, 1, date(2024, 2, 1), Money::from_major(600))],
        );
        store.replace_installments(
            b_id,
            vec![Installment::new(b_id, 1, date(2024, 2, 1), Money::from_major(900))],
        );

        store.replace_installments(
            a_id,
            vec![
                Installment::new(a_id, 1, date(2024, 2, 1), Money::from_major(300)),
                Installment::new(a_id, 2, date(2024, 3, 1), Money::from_major(300)),
            ],
        );

        assert_eq!(store.installments(a_id).len(), 2);
        assert_eq!(store.installments(b_id).len(), 1);
    }

    #[test]
    fn test_missing_records_error() {
        let store = MemoryLedger::new();
        let id = uuid::Uuid::new_v4();
        assert!(matches!(
            store.contract(id),
            Err(LedgerError::ContractNotFound { .. })
        ));
        assert!(matches!(
            store.installment(id),
            Err(LedgerError::InstallmentNotFound { .. })
        ));
        assert!(matches!(
            store.payment(id),
            Err(LedgerError::PaymentNotFound { .. })
        ));
    }
}
