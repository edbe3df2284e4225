//! Bill aggregate
//!
//! A `Bill` accumulates line items and payments for one patient encounter.
//! The total is always the full re-sum of item amounts rather than an
//! incrementally adjusted figure, so it cannot drift, and the status is a
//! pure function of (paid amount, total, due date, today), re-derived after
//! every mutation.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, Currency, Money, PatientId};

use crate::error::BillingError;
use crate::payment::Payment;

/// Days after the issue date a bill falls due when no explicit due date
/// was recorded
pub const DEFAULT_DUE_DAYS: u64 = 30;

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    /// Nothing paid, not yet due
    Unpaid,
    /// Some but not all of the total paid
    Partial,
    /// Fully paid (or a zero-total bill discharged by a positive payment)
    Paid,
    /// Nothing paid and the due date has passed
    Overdue,
}

impl BillStatus {
    /// Derives the status from current amounts and dates.
    ///
    /// Pure: the same inputs always answer the same status. The zero-total
    /// case treats any positive paid amount as full discharge, since a
    /// remaining balance is undefined until items exist.
    pub fn derive(amount_paid: Money, total: Money, due_date: NaiveDate, today: NaiveDate) -> Self {
        let discharged = if total.is_positive() {
            amount_paid >= total
        } else {
            amount_paid.is_positive()
        };

        if discharged {
            BillStatus::Paid
        } else if amount_paid.is_positive() {
            BillStatus::Partial
        } else if due_date < today {
            BillStatus::Overdue
        } else {
            BillStatus::Unpaid
        }
    }
}

/// A single charge entry on a bill
///
/// Immutable once added; corrections are made with offsetting items, never
/// in-place edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    /// What was charged for
    pub description: String,
    /// Charge amount
    pub amount: Money,
}

impl BillItem {
    /// Creates a new line item
    pub fn new(description: impl Into<String>, amount: Money) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Aggregate record of charges and payments for one patient encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier issued by the allocator
    pub id: BillId,
    /// Owning patient, immutable post-creation
    pub patient_id: PatientId,
    /// Date the bill was issued
    pub issue_date: NaiveDate,
    /// Date of full payment, set when the bill reaches `Paid`
    pub date_paid: Option<NaiveDate>,
    /// Derived status
    pub status: BillStatus,
    /// Line items, in the order they were added (order is display-only)
    pub items: Vec<BillItem>,
    /// Full re-sum of item amounts
    pub total_amount: Money,
    /// Sum of completed payments
    pub amount_paid: Money,
    /// Bill currency
    pub currency: Currency,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a new unpaid bill with no items
    pub fn new(id: BillId, patient_id: PatientId, issue_date: NaiveDate, currency: Currency) -> Self {
        let now = Utc::now();

        Self {
            id,
            patient_id,
            issue_date,
            date_paid: None,
            status: BillStatus::Unpaid,
            items: Vec::new(),
            total_amount: Money::zero(currency),
            amount_paid: Money::zero(currency),
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a line item and recomputes the total
    ///
    /// # Errors
    ///
    /// - `Validation` if the description is blank, the amount is negative,
    ///   or the item currency does not match the bill
    pub fn add_item(&mut self, item: BillItem) -> Result<(), BillingError> {
        if item.description.trim().is_empty() {
            return Err(BillingError::validation("item description must not be blank"));
        }
        if item.amount.currency() != self.currency {
            return Err(BillingError::validation(format!(
                "item currency {} does not match bill currency {}",
                item.amount.currency(),
                self.currency
            )));
        }
        if item.amount.is_negative() {
            return Err(BillingError::validation("item amount must not be negative"));
        }

        self.items.push(item);
        self.recompute_total();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks whether a payment is acceptable under the payment policy
    ///
    /// For a positive-total bill, payments that would push the paid amount
    /// above the total are rejected. A zero-total bill accepts one positive
    /// payment as full discharge and rejects further payments.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not strictly positive or the
    ///   currency does not match
    /// - `PaymentExceedsBalance` under the overpay rule
    pub fn check_payment(&self, amount: Money) -> Result<(), BillingError> {
        if amount.currency() != self.currency {
            return Err(BillingError::validation(format!(
                "payment currency {} does not match bill currency {}",
                amount.currency(),
                self.currency
            )));
        }
        if !amount.is_positive() {
            return Err(BillingError::validation("payment amount must be positive"));
        }

        if self.total_amount.is_positive() {
            let prospective = self.amount_paid.checked_add(&amount)?;
            if prospective > self.total_amount {
                return Err(BillingError::PaymentExceedsBalance {
                    payment: amount.amount(),
                    balance: self.remaining_balance().amount(),
                });
            }
        } else if self.amount_paid.is_positive() {
            return Err(BillingError::validation(
                "bill is already discharged; no further payments accepted",
            ));
        }

        Ok(())
    }

    /// Applies a payment amount directly to the bill
    ///
    /// # Errors
    ///
    /// Propagates the payment policy of [`Bill::check_payment`].
    pub fn apply_payment(&mut self, amount: Money) -> Result<(), BillingError> {
        self.check_payment(amount)?;
        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Recomputes the paid amount as the sum of COMPLETED payments
    ///
    /// A full re-sum rather than an increment, so the figure stays correct
    /// when a payment is later refunded.
    pub fn settle_from_payments(&mut self, payments: &[Payment]) {
        self.amount_paid = payments
            .iter()
            .filter(|p| p.is_completed())
            .fold(Money::zero(self.currency), |acc, p| acc + p.amount);
        self.updated_at = Utc::now();
    }

    /// Re-derives the status from current amounts and dates
    ///
    /// Entering `Paid` stamps `date_paid`; leaving it (after a refund)
    /// clears the stamp.
    pub fn refresh_status(&mut self, tracked_due_date: Option<NaiveDate>, today: NaiveDate) {
        let due = self.effective_due_date(tracked_due_date);
        let status = BillStatus::derive(self.amount_paid, self.total_amount, due, today);

        if status == BillStatus::Paid {
            if self.date_paid.is_none() {
                self.date_paid = Some(today);
            }
        } else {
            self.date_paid = None;
        }
        self.status = status;
    }

    /// The date the bill falls due: the tracked date when one exists,
    /// otherwise thirty days past the issue date
    pub fn effective_due_date(&self, tracked_due_date: Option<NaiveDate>) -> NaiveDate {
        tracked_due_date.unwrap_or_else(|| self.issue_date + Days::new(DEFAULT_DUE_DAYS))
    }

    /// Unpaid remainder, floored at zero
    pub fn remaining_balance(&self) -> Money {
        if self.amount_paid >= self.total_amount {
            Money::zero(self.currency)
        } else {
            self.total_amount - self.amount_paid
        }
    }

    /// Recomputes the total as the full re-sum of item amounts
    fn recompute_total(&mut self) {
        self.total_amount = self
            .items
            .iter()
            .fold(Money::zero(self.currency), |acc, item| acc + item.amount);
    }
}
