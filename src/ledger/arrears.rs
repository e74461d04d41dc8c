use chrono::NaiveDate;

use crate::config::ArrearsConfig;
use crate::decimal::Money;
use crate::events::{Event, EventStore};
use crate::model::{Contract, Installment};
use crate::types::InstallmentStatus;

/// outcome of one arrears pass over a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrearsOutcome {
    pub in_arrears: bool,
    /// the contract flag flipped and needs persisting
    pub flag_changed: bool,
}

/// evaluates late fees and overdue status for a contract's installments
/// against the global arrears configuration
pub struct ArrearsEngine<'a> {
    config: Option<&'a ArrearsConfig>,
}

impl<'a> ArrearsEngine<'a> {
    pub fn new(config: Option<&'a ArrearsConfig>) -> Self {
        Self { config }
    }

    /// one full pass: every unpaid installment past its due date gets its
    /// fee recomputed and is forced overdue; exempt installments are
    /// cleared instead. updates the contract's arrears flag.
    pub fn assess(
        &self,
        contract: &mut Contract,
        installments: &mut [Installment],
        today: NaiveDate,
        events: &mut EventStore,
    ) -> ArrearsOutcome {
        // conservative fallbacks when no configuration record exists:
        // fees start the day after the due date at the default rate
        let (grace_days, percent_rate) = match self.config {
            Some(config) => (config.grace_days(), config.percent_rate),
            None => (1, ArrearsConfig::default().percent_rate),
        };

        for installment in installments.iter_mut() {
            if installment.status == InstallmentStatus::Paid {
                continue;
            }
            if installment.due_date >= today {
                continue;
            }

            // exemption short-circuits all fee logic, including the
            // overdue marking below
            if installment.fee_exempt {
                installment.late_fee = Money::ZERO;
                installment.status = if installment.outstanding().is_zero() {
                    InstallmentStatus::Paid
                } else {
                    InstallmentStatus::Pending
                };
                continue;
            }

            let days_late = (today - installment.due_date).num_days() as u32;

            let fixed_fee = match self.config {
                Some(config) => config.fixed_fee(days_late),
                None => Money::ZERO,
            };

            let mut late_fee = fixed_fee;
            if days_late >= grace_days {
                let mut percent_fee = installment.principal_due.percentage(percent_rate);
                // tiny principals round to nothing; charge the minimum cent
                if percent_fee < Money::CENT && percent_rate.is_positive() {
                    percent_fee = Money::CENT;
                }
                late_fee = late_fee.max(percent_fee);
            }

            if late_fee != installment.late_fee {
                events.emit(Event::LateFeeAssessed {
                    contract_id: contract.id,
                    installment_id: installment.id,
                    sequence: installment.sequence,
                    fee: late_fee,
                    days_late,
                });
            }

            // overdue is purely a function of the passed due date, even
            // when the assessed fee is zero
            installment.late_fee = late_fee;
            installment.status = InstallmentStatus::Overdue;
        }

        let in_arrears = installments
            .iter()
            .any(|i| i.status == InstallmentStatus::Overdue);
        let flag_changed = contract.in_arrears != in_arrears;
        if flag_changed {
            contract.in_arrears = in_arrears;
            events.emit(Event::ArrearsFlagChanged {
                contract_id: contract.id,
                in_arrears,
            });
        }

        ArrearsOutcome {
            in_arrears,
            flag_changed,
        }
    }
}
