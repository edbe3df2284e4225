//! Payment records
//!
//! A `Payment` is the record of a single transaction against a bill. A
//! bill's payment history is append-only; the only post-creation mutation
//! on a payment is a forward status transition. Amount and bill id never
//! change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, Money, PaymentId};

use crate::error::BillingError;

/// Payment status
///
/// Transitions are forward-only: Pending -> Completed, Pending -> Failed,
/// Completed -> Refunded. Only COMPLETED payments count toward a bill's
/// paid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Payment is being processed
    Pending,
    /// Payment settled successfully
    Completed,
    /// Payment did not settle
    Failed,
    /// A completed payment was returned to the payer
    Refunded,
}

/// A payment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Bill being paid
    pub bill_id: BillId,
    /// Payment amount
    pub amount: Money,
    /// Free-form method code supplied by the caller (e.g. "CASH", "CARD")
    pub method: String,
    /// Status
    pub status: PaymentStatus,
    /// When the payment was taken
    pub payment_date: DateTime<Utc>,
    /// When status changed to completed
    pub completed_at: Option<DateTime<Utc>>,
    /// Notes (failure or refund reason)
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment
    pub fn new(bill_id: BillId, amount: Money, method: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: PaymentId::new_v7(),
            bill_id,
            amount,
            method: method.into(),
            status: PaymentStatus::Pending,
            payment_date: now,
            completed_at: None,
            notes: None,
            created_at: now,
        }
    }

    /// Marks the payment as completed
    ///
    /// # Errors
    ///
    /// Only a pending payment can complete.
    pub fn complete(&mut self) -> Result<(), BillingError> {
        match self.status {
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Completed;
                self.completed_at = Some(Utc::now());
                Ok(())
            }
            from => Err(BillingError::InvalidPaymentTransition {
                from,
                to: PaymentStatus::Completed,
            }),
        }
    }

    /// Marks the payment as failed
    ///
    /// # Errors
    ///
    /// Only a pending payment can fail.
    pub fn fail(&mut self, reason: &str) -> Result<(), BillingError> {
        match self.status {
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Failed;
                self.notes = Some(reason.to_string());
                Ok(())
            }
            from => Err(BillingError::InvalidPaymentTransition {
                from,
                to: PaymentStatus::Failed,
            }),
        }
    }

    /// Refunds the payment
    ///
    /// # Errors
    ///
    /// Only a completed payment can be refunded.
    pub fn refund(&mut self, reason: &str) -> Result<(), BillingError> {
        match self.status {
            PaymentStatus::Completed => {
                self.status = PaymentStatus::Refunded;
                self.notes = Some(format!("Refunded: {}", reason));
                Ok(())
            }
            from => Err(BillingError::InvalidPaymentTransition {
                from,
                to: PaymentStatus::Refunded,
            }),
        }
    }

    /// True when the payment counts toward a bill's paid amount
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}
