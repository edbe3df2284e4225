//! Billing engine
//!
//! The engine owns the three billing stores — bills, payment histories, and
//! tracked due dates — and exposes the operation-level API that keeps every
//! mutation on an invariant-preserving path. There is no global state: a
//! fresh engine is a clean slate, which is also how tests isolate
//! themselves.
//!
//! All state sits behind a single mutex. Operations are short, perform no
//! I/O, and never suspend, so one lock around each public call makes
//! create/read/update on any bill serializable: a payment's
//! read-modify-write on the paid amount and the status re-derivation that
//! follows it share one critical section.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use core_kernel::{BillId, Currency, Money, PatientId, PaymentId};
use domain_patient::PatientDirectory;

use crate::allocator::BillNumberAllocator;
use crate::bill::{Bill, BillItem, BillStatus};
use crate::error::BillingError;
use crate::payment::Payment;

#[derive(Debug, Default)]
struct EngineState {
    bills: HashMap<BillId, Bill>,
    /// Append-only payment history per bill
    payments: HashMap<BillId, Vec<Payment>>,
    /// Explicit due dates; bills without an entry fall back to the
    /// thirty-day default at derivation time
    due_dates: HashMap<BillId, NaiveDate>,
}

/// Orchestrates the bill lifecycle: creation, item addition, payment
/// processing, and query/reporting
///
/// The patient directory is consulted once, at bill creation, to validate
/// ownership. Every query hands back clones with freshly derived status;
/// internal collections are never exposed for external mutation.
pub struct BillingEngine {
    directory: Arc<dyn PatientDirectory>,
    allocator: BillNumberAllocator,
    currency: Currency,
    state: Mutex<EngineState>,
}

impl BillingEngine {
    /// Creates an engine with empty stores
    pub fn new(directory: Arc<dyn PatientDirectory>, currency: Currency) -> Self {
        Self {
            directory,
            allocator: BillNumberAllocator::new(),
            currency,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// The currency all bills under this engine are kept in
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Creates a bill for a patient
    ///
    /// The description becomes an initial zero-amount line item so the item
    /// list always carries a label. An explicit due date is recorded in the
    /// due-date store; without one the thirty-day default applies at
    /// derivation time.
    ///
    /// # Errors
    ///
    /// - `Validation` if the description is blank or the due date precedes
    ///   today (today itself is accepted)
    /// - `PatientNotFound` if the directory has no such patient
    #[instrument(skip(self))]
    pub fn create_bill(
        &self,
        patient_id: &PatientId,
        description: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Bill, BillingError> {
        let today = Utc::now().date_naive();

        if description.trim().is_empty() {
            return Err(BillingError::validation("bill description must not be blank"));
        }
        if let Some(due) = due_date {
            if due < today {
                return Err(BillingError::validation(format!(
                    "due date {} precedes today {}",
                    due, today
                )));
            }
        }

        let patient = self
            .directory
            .find_patient(patient_id)
            .ok_or_else(|| BillingError::PatientNotFound(patient_id.to_string()))?;

        let id = self.allocator.allocate();

        let mut guard = self.lock_state();
        let state = &mut *guard;

        if state.bills.contains_key(&id) {
            return Err(BillingError::DuplicateBillId(id.to_string()));
        }

        let mut bill = Bill::new(id, patient.id, today, self.currency);
        bill.add_item(BillItem::new(description, Money::zero(self.currency)))?;
        bill.refresh_status(due_date, today);

        if let Some(due) = due_date {
            state.due_dates.insert(id, due);
        }
        state.payments.insert(id, Vec::new());
        state.bills.insert(id, bill.clone());

        info!(bill_id = %id, patient_id = %patient_id, "bill created");
        Ok(bill)
    }

    /// Appends a line item to an existing bill
    ///
    /// # Errors
    ///
    /// - `BillNotFound` if the bill id is unknown
    /// - `Validation` per [`Bill::add_item`]
    #[instrument(skip(self))]
    pub fn add_item_to_bill(
        &self,
        bill_id: &BillId,
        description: &str,
        amount: Money,
    ) -> Result<Bill, BillingError> {
        let today = Utc::now().date_naive();

        let mut guard = self.lock_state();
        let state = &mut *guard;

        let bill = state
            .bills
            .get_mut(bill_id)
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))?;

        bill.add_item(BillItem::new(description, amount))?;
        bill.refresh_status(state.due_dates.get(bill_id).copied(), today);

        debug!(bill_id = %bill_id, total = %bill.total_amount, "line item added");
        Ok(bill.clone())
    }

    /// Records a payment against a bill
    ///
    /// Settlement is synchronous in-process: the payment is completed and
    /// appended to the bill's history, the paid amount is recomputed as the
    /// full re-sum of completed payments, and the status is re-derived, all
    /// under one critical section.
    ///
    /// # Errors
    ///
    /// - `BillNotFound` if the bill id is unknown
    /// - `Validation` if the amount is not positive or the method is blank
    /// - `PaymentExceedsBalance` under the overpay rule
    #[instrument(skip(self))]
    pub fn process_payment(
        &self,
        bill_id: &BillId,
        amount: Money,
        method: &str,
    ) -> Result<Payment, BillingError> {
        let today = Utc::now().date_naive();

        if method.trim().is_empty() {
            return Err(BillingError::validation("payment method must not be blank"));
        }

        let mut guard = self.lock_state();
        let state = &mut *guard;

        let bill = state
            .bills
            .get_mut(bill_id)
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))?;

        bill.check_payment(amount)?;

        let mut payment = Payment::new(*bill_id, amount, method);
        payment.complete()?;

        let history = state.payments.entry(*bill_id).or_default();
        history.push(payment.clone());

        bill.settle_from_payments(history);
        bill.refresh_status(state.due_dates.get(bill_id).copied(), today);

        info!(
            bill_id = %bill_id,
            amount = %amount,
            status = ?bill.status,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Refunds a completed payment and re-derives the bill's state
    ///
    /// The paid amount is re-summed from the remaining completed payments,
    /// so a fully paid bill may revert to partial or unpaid and its paid
    /// date is cleared.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if no bill's history holds the payment
    /// - `InvalidPaymentTransition` if the payment was never completed
    #[instrument(skip(self))]
    pub fn refund_payment(
        &self,
        payment_id: &PaymentId,
        reason: &str,
    ) -> Result<Payment, BillingError> {
        let today = Utc::now().date_naive();

        let mut guard = self.lock_state();
        let state = &mut *guard;

        let (bill_id, index) = state
            .payments
            .iter()
            .find_map(|(bill_id, history)| {
                history
                    .iter()
                    .position(|p| p.id == *payment_id)
                    .map(|index| (*bill_id, index))
            })
            .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;

        let refunded = {
            let history = state
                .payments
                .get_mut(&bill_id)
                .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;
            let payment = history
                .get_mut(index)
                .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;
            payment.refund(reason)?;
            payment.clone()
        };

        let bill = state
            .bills
            .get_mut(&bill_id)
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))?;

        bill.settle_from_payments(state.payments.get(&bill_id).map(Vec::as_slice).unwrap_or(&[]));
        bill.refresh_status(state.due_dates.get(&bill_id).copied(), today);

        info!(
            bill_id = %bill_id,
            payment_id = %payment_id,
            status = ?bill.status,
            "payment refunded"
        );
        Ok(refunded)
    }

    /// Looks up a single bill
    pub fn find_bill_by_id(&self, bill_id: &BillId) -> Option<Bill> {
        let today = Utc::now().date_naive();
        let guard = self.lock_state();

        guard
            .bills
            .get(bill_id)
            .map(|bill| Self::bill_view(bill, &guard.due_dates, today))
    }

    /// All bills owned by a patient, in id order
    pub fn find_bills_by_patient_id(&self, patient_id: &PatientId) -> Vec<Bill> {
        let today = Utc::now().date_naive();
        let guard = self.lock_state();

        let mut bills: Vec<Bill> = guard
            .bills
            .values()
            .filter(|bill| bill.patient_id == *patient_id)
            .map(|bill| Self::bill_view(bill, &guard.due_dates, today))
            .collect();
        bills.sort_by_key(|bill| bill.id);
        bills
    }

    /// Every bill the engine tracks, in id order
    pub fn get_all_bills(&self) -> Vec<Bill> {
        let today = Utc::now().date_naive();
        let guard = self.lock_state();

        let mut bills: Vec<Bill> = guard
            .bills
            .values()
            .map(|bill| Self::bill_view(bill, &guard.due_dates, today))
            .collect();
        bills.sort_by_key(|bill| bill.id);
        bills
    }

    /// Bills with derived status PAID when `paid` is true, every non-PAID
    /// bill otherwise
    pub fn get_bills_by_status(&self, paid: bool) -> Vec<Bill> {
        self.get_all_bills()
            .into_iter()
            .filter(|bill| (bill.status == BillStatus::Paid) == paid)
            .collect()
    }

    /// Bills whose tracked due date is strictly before today and whose
    /// derived status is not PAID
    ///
    /// Only explicitly recorded due dates are consulted; the thirty-day
    /// default is a derivation concern, not a tracking one.
    pub fn get_overdue_bills(&self) -> Vec<Bill> {
        let today = Utc::now().date_naive();
        let guard = self.lock_state();

        let mut bills: Vec<Bill> = guard
            .due_dates
            .iter()
            .filter(|(_, due)| **due < today)
            .filter_map(|(bill_id, _)| guard.bills.get(bill_id))
            .map(|bill| Self::bill_view(bill, &guard.due_dates, today))
            .filter(|bill| bill.status != BillStatus::Paid)
            .collect();
        bills.sort_by_key(|bill| bill.id);
        bills
    }

    /// Read-only view of a bill's payment history
    ///
    /// # Errors
    ///
    /// Returns `BillNotFound` if the bill id is unknown.
    pub fn get_payments_for_bill(&self, bill_id: &BillId) -> Result<Vec<Payment>, BillingError> {
        let guard = self.lock_state();

        if !guard.bills.contains_key(bill_id) {
            return Err(BillingError::BillNotFound(bill_id.to_string()));
        }
        Ok(guard.payments.get(bill_id).cloned().unwrap_or_default())
    }

    /// The explicitly recorded due date for a bill, if any
    pub fn tracked_due_date(&self, bill_id: &BillId) -> Option<NaiveDate> {
        let guard = self.lock_state();
        guard.due_dates.get(bill_id).copied()
    }

    /// Number of bills the engine tracks
    pub fn bill_count(&self) -> usize {
        let guard = self.lock_state();
        guard.bills.len()
    }

    /// Summarizes outstanding balances across all non-PAID bills
    pub fn receivables_report(&self) -> ReceivablesReport {
        let today = Utc::now().date_naive();
        let guard = self.lock_state();

        let mut entries = Vec::new();
        let mut total_outstanding = Money::zero(self.currency);

        let mut bills: Vec<&Bill> = guard.bills.values().collect();
        bills.sort_by_key(|bill| bill.id);

        for bill in bills {
            let view = Self::bill_view(bill, &guard.due_dates, today);
            if view.status == BillStatus::Paid {
                continue;
            }

            let balance = view.remaining_balance();
            total_outstanding = total_outstanding + balance;
            entries.push(ReceivablesEntry {
                bill_id: view.id,
                patient_id: view.patient_id,
                balance,
                overdue: view.status == BillStatus::Overdue,
            });
        }

        ReceivablesReport {
            entries,
            total_outstanding,
        }
    }

    /// Clones a stored bill with its status derived as of `today`
    ///
    /// Overdue-ness moves with the clock without any mutation, so stored
    /// status is refreshed on the way out.
    fn bill_view(bill: &Bill, due_dates: &HashMap<BillId, NaiveDate>, today: NaiveDate) -> Bill {
        let mut view = bill.clone();
        view.refresh_status(due_dates.get(&bill.id).copied(), today);
        view
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Outstanding-balance summary across the bill store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivablesReport {
    /// One entry per bill still carrying a balance
    pub entries: Vec<ReceivablesEntry>,
    /// Sum of all outstanding balances
    pub total_outstanding: Money,
}

/// A single bill's outstanding position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivablesEntry {
    /// Bill identifier
    pub bill_id: BillId,
    /// Owning patient
    pub patient_id: PatientId,
    /// Unpaid remainder
    pub balance: Money,
    /// Whether the bill's derived status is OVERDUE
    pub overdue: bool,
}
