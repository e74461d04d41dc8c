use chrono::NaiveDate;

use crate::config::ArrearsConfig;
use crate::decimal::Money;
use crate::events::{Event, EventStore};
use crate::ledger::arrears::ArrearsEngine;
use crate::model::{Contract, Installment, Payment};

/// full ledger recomputation: resets every installment and re-applies the
/// complete payment history in chronological order.
///
/// required whenever a payment is edited or removed, because direct edits
/// cannot be safely undone incrementally. replaying an unchanged payment
/// set is a no-op on the resulting installment states.
pub struct LedgerReplayer;

impl LedgerReplayer {
    /// replay `payments` (ordered by date, then ledger sequence) over
    /// `installments` (ordered by sequence number), then recompute every
    /// status and run the arrears pass
    pub fn replay(
        contract: &mut Contract,
        installments: &mut [Installment],
        payments: &[Payment],
        config: Option<&ArrearsConfig>,
        today: NaiveDate,
        events: &mut EventStore,
    ) {
        // wipe collection state only; fees and exemption flags are manual
        // or arrears-owned and survive the reset
        for installment in installments.iter_mut() {
            installment.amount_paid = Money::ZERO;
            installment.last_payment_date = None;
        }

        // re-apply each payment oldest-installment-first; any starting
        // installment the original payment was directed at is not kept on
        // the payment record, so replay always fills the oldest debt first
        for payment in payments {
            let mut funds = payment.amount;

            for installment in installments.iter_mut() {
                if !funds.is_positive() {
                    break;
                }

                let outstanding = installment.outstanding();
                if outstanding.is_zero() {
                    continue;
                }

                if funds >= outstanding {
                    installment.amount_paid += outstanding;
                    installment.last_payment_date = Some(payment.date);
                    funds -= outstanding;
                } else {
                    installment.amount_paid += funds;
                    installment.last_payment_date = Some(payment.date);
                    funds = Money::ZERO;
                }
            }
        }

        // statuses were ignored while money moved; resolve them all now
        for installment in installments.iter_mut() {
            installment.status = installment.resolve_status(today);
        }

        ArrearsEngine::new(config).assess(contract, installments, today, events);

        events.emit(Event::LedgerRecalculated {
            contract_id: contract.id,
            payments_replayed: payments.len() as u32,
        });
    }
}
