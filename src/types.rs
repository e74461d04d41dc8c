use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a contract
pub type ContractId = Uuid;

/// unique identifier for an installment
pub type InstallmentId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// contract lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    /// schedule running, payments accepted
    Active,
    /// fully paid and closed
    Closed,
    /// voided before taking effect
    Voided,
    /// cancelled by either party, lots released
    Cancelled,
    /// cancelled with the collected money returned
    Refunded,
}

/// installment payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    /// not yet due, nothing collected
    Pending,
    /// partially collected
    Partial,
    /// fully collected
    Paid,
    /// past due with balance remaining
    Overdue,
}

impl InstallmentStatus {
    /// true while the installment can still receive funds
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            InstallmentStatus::Pending | InstallmentStatus::Partial | InstallmentStatus::Overdue
        )
    }
}

/// how a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    /// manual correction entry written by the engine, amount may be negative
    Adjustment,
}

/// result of distributing one payment across a contract's installments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AllocationReport {
    /// funds absorbed by installments
    pub consumed: Money,
    /// funds left after no eligible installment remained
    pub leftover: Money,
    /// installments marked paid during this allocation
    pub settled: u32,
}
