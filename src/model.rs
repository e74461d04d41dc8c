use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{
    ContractId, ContractStatus, InstallmentId, InstallmentStatus, PaymentId, PaymentMethod,
};

/// a financed sale paid in monthly installments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    /// agreed sale price before the down payment
    pub sale_price: Money,
    pub down_payment: Money,
    /// amount financed through the schedule; sale price minus down payment
    pub principal: Money,
    /// number of installments
    pub term: u32,
    pub contract_date: NaiveDate,
    /// stamped when the contract leaves Active
    pub end_date: Option<NaiveDate>,
    pub status: ContractStatus,
    /// derived: at least one installment is currently overdue
    pub in_arrears: bool,
    pub note: Option<String>,
}

impl Contract {
    pub fn new(
        sale_price: Money,
        down_payment: Money,
        term: u32,
        contract_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sale_price,
            down_payment,
            principal: sale_price - down_payment,
            term,
            contract_date,
            end_date: None,
            status: ContractStatus::Active,
            in_arrears: false,
            note: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }
}

/// one scheduled repayment unit of a contract's principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub contract_id: ContractId,
    /// position in the schedule, 1..=term
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub principal_due: Money,
    /// recomputed by the arrears pass, never edited directly
    pub late_fee: Money,
    pub amount_paid: Money,
    pub status: InstallmentStatus,
    /// manual override: suppresses late fees regardless of lateness
    pub fee_exempt: bool,
    pub last_payment_date: Option<NaiveDate>,
}

impl Installment {
    pub fn new(
        contract_id: ContractId,
        sequence: u32,
        due_date: NaiveDate,
        principal_due: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            sequence,
            due_date,
            principal_due,
            late_fee: Money::ZERO,
            amount_paid: Money::ZERO,
            status: InstallmentStatus::Pending,
            fee_exempt: false,
            last_payment_date: None,
        }
    }

    /// principal plus the currently assessed late fee
    pub fn total_due(&self) -> Money {
        self.principal_due + self.late_fee
    }

    /// remaining balance, zero once under the sub-cent tolerance
    pub fn outstanding(&self) -> Money {
        (self.total_due() - self.amount_paid).clamped()
    }

    /// ordered guard list for recomputing the status from scratch, used by
    /// ledger replay and by manual installment adjustments
    pub fn resolve_status(&self, today: NaiveDate) -> InstallmentStatus {
        if self.outstanding().is_zero() {
            InstallmentStatus::Paid
        } else if self.due_date < today && !self.fee_exempt {
            InstallmentStatus::Overdue
        } else if self.amount_paid.is_positive() {
            InstallmentStatus::Partial
        } else if self.due_date < today {
            // only exempt unpaid installments land here; the arrears pass
            // that follows every replay rewrites them to Pending
            InstallmentStatus::Overdue
        } else {
            InstallmentStatus::Pending
        }
    }
}

/// money received against a contract; never linked to a specific
/// installment so the ledger can be replayed from history alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub contract_id: ContractId,
    /// ledger position assigned by the store at insert; chronological
    /// tie-break during replay
    pub sequence: u64,
    pub date: NaiveDate,
    /// negative only for manual correction entries
    pub amount: Money,
    pub method: PaymentMethod,
    /// receipt image or transfer reference supplied by the caller
    pub evidence_ref: Option<String>,
    pub note: Option<String>,
    pub recorded_by: String,
}

impl Payment {
    pub fn new(
        contract_id: ContractId,
        date: NaiveDate,
        amount: Money,
        method: PaymentMethod,
        evidence_ref: Option<String>,
        recorded_by: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            sequence: 0,
            date,
            amount,
            method,
            evidence_ref,
            note: None,
            recorded_by: recorded_by.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(due: NaiveDate) -> Installment {
        Installment::new(Uuid::new_v4(), 1, due, Money::from_major(100))
    }

    #[test]
    fn test_outstanding_includes_fee_and_clamps() {
        let mut inst = installment(date(2024, 1, 15));
        inst.late_fee = Money::from_major(10);
        inst.amount_paid = Money::from_major(50);

        assert_eq!(inst.total_due(), Money::from_major(110));
        assert_eq!(inst.outstanding(), Money::from_major(60));

        // overpayment clamps to zero rather than going negative
        inst.amount_paid = Money::from_major(115);
        assert_eq!(inst.outstanding(), Money::ZERO);
    }

    #[test]
    fn test_resolve_status_guard_order() {
        let today = date(2024, 6, 1);

        let mut paid = installment(date(2024, 1, 15));
        paid.amount_paid = Money::from_major(100);
        assert_eq!(paid.resolve_status(today), InstallmentStatus::Paid);

        // overdue wins over partial
        let mut late_partial = installment(date(2024, 5, 1));
        late_partial.amount_paid = Money::from_major(40);
        assert_eq!(late_partial.resolve_status(today), InstallmentStatus::Overdue);

        let mut future_partial = installment(date(2024, 7, 1));
        future_partial.amount_paid = Money::from_major(40);
        assert_eq!(future_partial.resolve_status(today), InstallmentStatus::Partial);

        let untouched = installment(date(2024, 7, 1));
        assert_eq!(untouched.resolve_status(today), InstallmentStatus::Pending);

        // exempt, unpaid and overdue: still flagged overdue here, the
        // arrears pass is what clears it
        let mut exempt = installment(date(2024, 5, 1));
        exempt.fee_exempt = true;
        assert_eq!(exempt.resolve_status(today), InstallmentStatus::Overdue);
    }

    #[test]
    fn test_contract_principal_derived() {
        let contract = Contract::new(
            Money::from_major(15_000),
            Money::from_major(3_000),
            24,
            date(2024, 1, 10),
        );
        assert_eq!(contract.principal, Money::from_major(12_000));
        assert!(contract.is_active());
        assert!(!contract.in_arrears);
    }
}
