use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::warn;

use crate::errors::{LedgerError, Result};
use crate::model::{Contract, Installment};

/// builds the initial amortization schedule for a contract
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// generate the full set of installments for a contract.
    ///
    /// the base installment is the principal divided evenly and rounded to
    /// cents; the last installment absorbs the rounding remainder so the
    /// schedule always sums back to the contract principal. the first due
    /// date is the override when given and parseable, otherwise one month
    /// after the contract date; each later installment falls one month
    /// after the previous.
    pub fn generate(
        contract: &Contract,
        first_due_override: Option<&str>,
    ) -> Result<Vec<Installment>> {
        if contract.term == 0 {
            return Err(LedgerError::InvalidTerm {
                term: contract.term,
            });
        }

        let first_due = resolve_first_due(contract.contract_date, first_due_override);
        let base = contract.principal / Decimal::from(contract.term);

        let mut installments = Vec::with_capacity(contract.term as usize);
        let mut remaining = contract.principal;

        for sequence in 1..=contract.term {
            let due_date = months_after(first_due, sequence - 1);
            let principal_due = if sequence == contract.term {
                // cent adjustment on the final installment
                remaining
            } else {
                base
            };
            remaining -= principal_due;

            installments.push(Installment::new(
                contract.id,
                sequence,
                due_date,
                principal_due,
            ));
        }

        Ok(installments)
    }
}

/// pick the first due date: a parseable override wins, anything else falls
/// back to one month after the contract date
fn resolve_first_due(contract_date: NaiveDate, first_due_override: Option<&str>) -> NaiveDate {
    match first_due_override {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                warn!(input = raw, "unparseable first due date, falling back to contract date + 1 month");
                months_after(contract_date, 1)
            }
        },
        None => months_after(contract_date, 1),
    }
}

/// calendar month addition with the day of month clamped (Jan 31 + 1 month
/// = Feb 28/29); chrono only fails at the representable-date boundary
pub(crate) fn months_after(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}
