use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::model::{Contract, Installment, Payment};
use crate::types::{ContractId, ContractStatus, InstallmentStatus};

/// point-in-time view of a contract's ledger for the surrounding screens,
/// receipts and reports; built after an arrears refresh so the figures
/// are current without any background job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractStatement {
    pub contract_id: ContractId,
    pub status: ContractStatus,
    pub in_arrears: bool,
    /// full schedule ordered by sequence number
    pub installments: Vec<Installment>,
    /// late fees carried by the currently overdue installments
    pub total_late_fee: Money,
    /// sum of per-installment remaining balances
    pub outstanding_total: Money,
    /// sum of the recorded payment history, corrections included
    pub total_paid: Money,
    /// first installment still pending or partial; overdue ones are
    /// surfaced separately through `in_arrears`
    pub next_open: Option<u32>,
    pub can_close: bool,
}

impl ContractStatement {
    pub fn build(
        contract: &Contract,
        installments: Vec<Installment>,
        payments: &[Payment],
    ) -> Self {
        let total_late_fee = installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Overdue)
            .map(|i| i.late_fee)
            .fold(Money::ZERO, |acc, x| acc + x);

        let outstanding_total = installments
            .iter()
            .map(|i| i.outstanding())
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_paid = payments
            .iter()
            .map(|p| p.amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        let next_open = installments
            .iter()
            .find(|i| {
                matches!(
                    i.status,
                    InstallmentStatus::Pending | InstallmentStatus::Partial
                )
            })
            .map(|i| i.sequence);

        let can_close = outstanding_total.is_zero() && contract.is_active();

        Self {
            contract_id: contract.id,
            status: contract.status,
            in_arrears: contract.in_arrears,
            installments,
            total_late_fee,
            outstanding_total,
            total_paid,
            next_open,
            can_close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (Contract, Vec<Installment>, Vec<Payment>) {
        let mut contract =
            Contract::new(Money::from_major(300), Money::ZERO, 3, date(2024, 1, 1));
        contract.in_arrears = true;

        let mut installments: Vec<Installment> = (1..=3)
            .map(|i| {
                Installment::new(
                    contract.id,
                    i,
                    date(2024, 1 + i, 1),
                    Money::from_major(100),
                )
            })
            .collect();

        installments[0].late_fee = Money::from_major(3);
        installments[0].status = InstallmentStatus::Overdue;
        installments[1].amount_paid = Money::from_major(40);
        installments[1].status = InstallmentStatus::Partial;

        let payment = Payment::new(
            contract.id,
            date(2024, 2, 20),
            Money::from_major(40),
            PaymentMethod::Cash,
            None,
            "clerk",
        );

        (contract, installments, vec![payment])
    }

    #[test]
    fn test_statement_figures() {
        let (contract, installments, payments) = fixture();
        let statement = ContractStatement::build(&contract, installments, &payments);

        assert_eq!(statement.total_late_fee, Money::from_major(3));
        // 103 open on the first, 60 on the second, 100 on the third
        assert_eq!(statement.outstanding_total, Money::from_major(263));
        assert_eq!(statement.total_paid, Money::from_major(40));
        // the overdue first installment is not the "next" one
        assert_eq!(statement.next_open, Some(2));
        assert!(statement.in_arrears);
        assert!(!statement.can_close);
    }

    #[test]
    fn test_statement_serializes_for_report_consumers() {
        let (contract, installments, payments) = fixture();
        let statement = ContractStatement::build(&contract, installments, &payments);

        let json = serde_json::to_string(&statement).unwrap();
        let back: ContractStatement = serde_json::from_str(&json).unwrap();

        assert_eq!(back.contract_id, statement.contract_id);
        assert_eq!(back.outstanding_total, statement.outstanding_total);
        assert_eq!(back.installments.len(), 3);
    }
}
