use chrono::NaiveDate;

use crate::decimal::Money;
use crate::model::Installment;
use crate::types::{AllocationReport, InstallmentStatus};

/// distributes a single payment across a contract's outstanding
/// installments, oldest first (the waterfall)
pub struct PaymentAllocator;

impl PaymentAllocator {
    /// run the waterfall over installments ordered by sequence number.
    ///
    /// with a starting sequence the waterfall begins at that installment
    /// and older unpaid installments are deliberately skipped; funds that
    /// outlast the eligible installments come back as leftover credit.
    pub fn allocate(
        installments: &mut [Installment],
        amount: Money,
        payment_date: NaiveDate,
        start_sequence: Option<u32>,
    ) -> AllocationReport {
        let mut funds = amount;
        let mut settled = 0u32;

        for installment in installments.iter_mut() {
            if !funds.is_positive() {
                break;
            }
            if !installment.status.is_open() {
                continue;
            }
            if let Some(start) = start_sequence {
                if installment.sequence < start {
                    continue;
                }
            }

            let outstanding = installment.outstanding();

            // already settled within the tolerance: close it out without
            // consuming funds
            if outstanding.is_zero() {
                installment.status = InstallmentStatus::Paid;
                installment.last_payment_date = Some(payment_date);
                settled += 1;
                continue;
            }

            if funds >= outstanding {
                installment.amount_paid += outstanding;
                installment.status = InstallmentStatus::Paid;
                installment.last_payment_date = Some(payment_date);
                funds -= outstanding;
                settled += 1;
            } else {
                installment.amount_paid += funds;
                installment.status = if installment.outstanding().is_zero() {
                    settled += 1;
                    InstallmentStatus::Paid
                } else {
                    InstallmentStatus::Partial
                };
                installment.last_payment_date = Some(payment_date);
                funds = Money::ZERO;
            }
        }

        AllocationReport {
            consumed: amount - funds,
            leftover: funds,
            settled,
        }
    }
}
