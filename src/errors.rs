use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid term: {term} installments")]
    InvalidTerm {
        term: u32,
    },

    #[error("contract not found: {id}")]
    ContractNotFound {
        id: Uuid,
    },

    #[error("installment not found: {id}")]
    InstallmentNotFound {
        id: Uuid,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: Uuid,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("contract has outstanding balance: {remaining}")]
    OutstandingBalance {
        remaining: Money,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
