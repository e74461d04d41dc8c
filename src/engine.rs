use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, warn};

use crate::config::ArrearsConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::{ArrearsEngine, LedgerReplayer, PaymentAllocator, ScheduleGenerator};
use crate::model::{Contract, Payment};
use crate::repository::LedgerStore;
use crate::statement::ContractStatement;
use crate::types::{
    ContractId, ContractStatus, InstallmentId, InstallmentStatus, PaymentId, PaymentMethod,
};

/// payment submission from a collaborator
#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub amount: Money,
    pub method: PaymentMethod,
    pub recorded_by: String,
    /// receipt image or transfer reference
    pub evidence_ref: Option<String>,
    /// `%Y-%m-%d`; missing or malformed falls back to today
    pub date: Option<String>,
    /// waterfall entry point; older unpaid installments are skipped
    pub start_sequence: Option<u32>,
}

impl PaymentInput {
    pub fn new(amount: Money, method: PaymentMethod, recorded_by: &str) -> Self {
        Self {
            amount,
            method,
            recorded_by: recorded_by.to_string(),
            evidence_ref: None,
            date: None,
            start_sequence: None,
        }
    }
}

/// ledger engine facade: every operation loads fresh records from the
/// store, runs the core components and persists the result.
///
/// operations mutate through `&mut self`, so one engine value serializes
/// all work on its contracts; callers that shard contracts across engines
/// must keep each contract pinned to a single engine. the arrears
/// configuration is explicit state handed in at construction, never read
/// from ambient globals.
pub struct LedgerEngine<S: LedgerStore> {
    store: S,
    arrears: Option<ArrearsConfig>,
    events: EventStore,
}

impl<S: LedgerStore> LedgerEngine<S> {
    pub fn new(store: S, arrears: Option<ArrearsConfig>) -> Self {
        Self {
            store,
            arrears,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn set_arrears_config(&mut self, config: Option<ArrearsConfig>) {
        self.arrears = config;
    }

    /// drain events collected by the operations so far
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// build (or rebuild) the contract's amortization schedule; any
    /// previous installments are discarded
    pub fn generate_schedule(
        &mut self,
        contract_id: ContractId,
        first_due_override: Option<&str>,
    ) -> Result<()> {
        let contract = self.store.contract(contract_id)?;
        let installments = ScheduleGenerator::generate(&contract, first_due_override)?;

        let first_due = installments[0].due_date;
        let count = installments.len() as u32;
        self.store.replace_installments(contract_id, installments);

        debug!(%contract_id, installments = count, "schedule generated");
        self.events.emit(Event::ScheduleGenerated {
            contract_id,
            installments: count,
            first_due,
        });
        Ok(())
    }

    /// recompute late fees and overdue status; idempotent and safe to
    /// call on every read path
    pub fn refresh_arrears(
        &mut self,
        contract_id: ContractId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let today = time_provider.now().date_naive();
        self.run_arrears(contract_id, today)
    }

    /// register a payment and pour it over the outstanding installments
    pub fn apply_payment(
        &mut self,
        contract_id: ContractId,
        input: PaymentInput,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        let contract = self.store.contract(contract_id)?;
        if !input.amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount: input.amount,
            });
        }

        let today = time_provider.now().date_naive();
        let pay_date = resolve_payment_date(input.date.as_deref(), today);

        let mut payment = self.store.insert_payment(Payment::new(
            contract.id,
            pay_date,
            input.amount,
            input.method,
            input.evidence_ref.clone(),
            &input.recorded_by,
        ));

        let mut installments = self.store.installments(contract_id);
        let open_before: Vec<InstallmentId> = installments
            .iter()
            .filter(|i| i.status.is_open())
            .map(|i| i.id)
            .collect();

        let report = PaymentAllocator::allocate(
            &mut installments,
            input.amount,
            pay_date,
            input.start_sequence,
        );

        for installment in &installments {
            if installment.status == InstallmentStatus::Paid
                && open_before.contains(&installment.id)
            {
                self.events.emit(Event::InstallmentSettled {
                    contract_id,
                    installment_id: installment.id,
                    sequence: installment.sequence,
                    date: pay_date,
                });
            }
        }
        for installment in installments {
            self.store.put_installment(installment);
        }

        if report.leftover.is_positive() {
            payment.note = Some(format!(
                "payment processed, unallocated credit: {}",
                report.leftover
            ));
            self.store.put_payment(payment.clone());
        }

        debug!(
            %contract_id,
            amount = %input.amount,
            consumed = %report.consumed,
            leftover = %report.leftover,
            "payment applied"
        );
        self.events.emit(Event::PaymentReceived {
            contract_id,
            payment_id: payment.id,
            amount: input.amount,
            consumed: report.consumed,
            leftover: report.leftover,
            date: pay_date,
        });

        self.run_arrears(contract_id, today)?;
        Ok(payment)
    }

    /// full replay of the payment history; the consistency hammer used
    /// after any mutation that is not a fresh append
    pub fn recalculate_ledger(
        &mut self,
        contract_id: ContractId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let today = time_provider.now().date_naive();
        let mut contract = self.store.contract(contract_id)?;
        let mut installments = self.store.installments(contract_id);
        let payments = self.store.payments(contract_id);

        LedgerReplayer::replay(
            &mut contract,
            &mut installments,
            &payments,
            self.arrears.as_ref(),
            today,
            &mut self.events,
        );

        for installment in installments {
            self.store.put_installment(installment);
        }
        self.store.put_contract(contract);

        debug!(%contract_id, payments = payments.len(), "ledger recalculated");
        Ok(())
    }

    /// flip the manual late-fee exemption on one installment and return
    /// the new flag
    pub fn toggle_exemption(
        &mut self,
        installment_id: InstallmentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<bool> {
        let mut installment = self.store.installment(installment_id)?;
        installment.fee_exempt = !installment.fee_exempt;

        let contract_id = installment.contract_id;
        let fee_exempt = installment.fee_exempt;
        self.store.put_installment(installment);

        self.events.emit(Event::ExemptionToggled {
            contract_id,
            installment_id,
            fee_exempt,
        });

        let today = time_provider.now().date_naive();
        self.run_arrears(contract_id, today)?;
        Ok(fee_exempt)
    }

    /// manually set an installment's collected amount and exemption.
    ///
    /// the difference against the previous amount is mirrored as a signed
    /// adjustment entry in the payment ledger, so cash reports and later
    /// replays stay consistent with the edit.
    pub fn adjust_installment(
        &mut self,
        installment_id: InstallmentId,
        new_amount_paid: Money,
        fee_exempt: bool,
        actor: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let today = time_provider.now().date_naive();
        let mut installment = self.store.installment(installment_id)?;
        let contract_id = installment.contract_id;
        let previous_paid = installment.amount_paid;
        let delta = new_amount_paid - previous_paid;

        if !delta.is_zero() {
            let mut correction = Payment::new(
                contract_id,
                today,
                delta,
                PaymentMethod::Adjustment,
                None,
                actor,
            );
            correction.note = Some(format!(
                "manual adjustment on installment #{}: {} -> {}",
                installment.sequence, previous_paid, new_amount_paid
            ));
            self.store.insert_payment(correction);
        }

        installment.amount_paid = new_amount_paid;
        installment.fee_exempt = fee_exempt;
        if fee_exempt {
            installment.late_fee = Money::ZERO;
        }
        installment.status = installment.resolve_status(today);

        let sequence = installment.sequence;
        self.store.put_installment(installment);

        self.events.emit(Event::InstallmentAdjusted {
            contract_id,
            installment_id,
            sequence,
            previous_paid,
            new_paid: new_amount_paid,
        });

        self.run_arrears(contract_id, today)
    }

    /// delete a payment and replay the remaining history
    pub fn remove_payment(
        &mut self,
        payment_id: PaymentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let payment = self.store.remove_payment(payment_id)?;

        self.events.emit(Event::PaymentRemoved {
            contract_id: payment.contract_id,
            payment_id,
            amount: payment.amount,
        });

        self.recalculate_ledger(payment.contract_id, time_provider)
    }

    /// delete an installment and replay the history over the remaining
    /// schedule (administrative correction of a malformed schedule)
    pub fn remove_installment(
        &mut self,
        installment_id: InstallmentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let installment = self.store.remove_installment(installment_id)?;
        self.recalculate_ledger(installment.contract_id, time_provider)
    }

    /// close a fully collected contract; refused while any balance remains
    pub fn close_contract(
        &mut self,
        contract_id: ContractId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let contract = self.store.contract(contract_id)?;
        let remaining = self
            .store
            .installments(contract_id)
            .iter()
            .map(|i| i.outstanding())
            .fold(Money::ZERO, |acc, x| acc + x);

        if remaining.is_positive() {
            return Err(LedgerError::OutstandingBalance { remaining });
        }

        self.transition(contract, ContractStatus::Closed, time_provider)
    }

    /// cancel the contract; releasing the underlying lots is the caller's
    /// concern
    pub fn cancel_contract(
        &mut self,
        contract_id: ContractId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let contract = self.store.contract(contract_id)?;
        self.transition(contract, ContractStatus::Cancelled, time_provider)
    }

    /// mark the contract refunded and return the total collected so far,
    /// which is the amount owed back to the buyer
    pub fn refund_contract(
        &mut self,
        contract_id: ContractId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Money> {
        let contract = self.store.contract(contract_id)?;
        let refundable = self
            .store
            .payments(contract_id)
            .iter()
            .map(|p| p.amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        self.transition(contract, ContractStatus::Refunded, time_provider)?;
        Ok(refundable)
    }

    /// current view of the contract for schedules, receipts and reports;
    /// arrears are refreshed first so the figures are never stale
    pub fn statement(
        &mut self,
        contract_id: ContractId,
        time_provider: &SafeTimeProvider,
    ) -> Result<ContractStatement> {
        let today = time_provider.now().date_naive();
        self.run_arrears(contract_id, today)?;

        let contract = self.store.contract(contract_id)?;
        let installments = self.store.installments(contract_id);
        let payments = self.store.payments(contract_id);
        Ok(ContractStatement::build(&contract, installments, &payments))
    }

    fn run_arrears(&mut self, contract_id: ContractId, today: NaiveDate) -> Result<()> {
        let mut contract = self.store.contract(contract_id)?;
        let mut installments = self.store.installments(contract_id);

        let outcome = ArrearsEngine::new(self.arrears.as_ref()).assess(
            &mut contract,
            &mut installments,
            today,
            &mut self.events,
        );

        for installment in installments {
            self.store.put_installment(installment);
        }
        if outcome.flag_changed {
            self.store.put_contract(contract);
        }
        Ok(())
    }

    fn transition(
        &mut self,
        mut contract: Contract,
        new_status: ContractStatus,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let today = time_provider.now().date_naive();
        let old_status = contract.status;
        let contract_id = contract.id;

        contract.status = new_status;
        contract.end_date = Some(today);
        self.store.put_contract(contract);

        self.events.emit(Event::ContractStatusChanged {
            contract_id,
            old_status,
            new_status,
            date: today,
        });
        Ok(())
    }
}

/// lenient payment date policy: a malformed or missing date becomes today
fn resolve_payment_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw {
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                warn!(input = s, "unparseable payment date, falling back to today");
                today
            }
        },
        None => today,
    }
}
