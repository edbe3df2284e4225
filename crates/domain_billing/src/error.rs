//! Billing domain errors
//!
//! Two classes exist: validation failures (malformed or out-of-range input,
//! policy rejections) and not-found failures (unknown patient, bill, or
//! payment ids). Every error is detected before any mutation for the call,
//! so a failed operation leaves every entity exactly as it was.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::MoneyError;

use crate::payment::PaymentStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown patient id at bill creation
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// Unknown bill id
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Unknown payment id
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Allocator produced an id the store already tracks
    #[error("Bill id already tracked: {0}")]
    DuplicateBillId(String),

    /// Payment would push the paid amount above the bill total
    #[error("Payment of {payment} exceeds remaining balance {balance}")]
    PaymentExceedsBalance { payment: Decimal, balance: Decimal },

    /// Payment status may only move forward
    #[error("Invalid payment status transition: {from:?} -> {to:?}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Monetary arithmetic failure (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    /// True for the validation class of the error taxonomy
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BillingError::Validation(_)
                | BillingError::DuplicateBillId(_)
                | BillingError::PaymentExceedsBalance { .. }
                | BillingError::InvalidPaymentTransition { .. }
                | BillingError::Money(_)
        )
    }

    /// True for the not-found class of the error taxonomy
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BillingError::PatientNotFound(_)
                | BillingError::BillNotFound(_)
                | BillingError::PaymentNotFound(_)
        )
    }
}
