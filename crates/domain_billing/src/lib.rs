//! Billing Domain - Bill Lifecycle and Payment Processing
//!
//! This crate implements the billing subsystem of the hospital back office:
//! bill creation, line-item accumulation, payment application, status
//! derivation, overdue detection, and collision-resistant bill-number
//! allocation under rapid creation bursts.
//!
//! # Status Derivation
//!
//! A bill's status (UNPAID, PARTIAL, PAID, OVERDUE) is a pure function of
//! its paid amount, its total, its due date, and today's date. It is
//! re-derived after every mutation and never stored as independently
//! settable truth, so it cannot desynchronize from the amounts.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::BillingEngine;
//!
//! let engine = BillingEngine::new(directory, Currency::USD);
//!
//! let bill = engine.create_bill(&patient_id, "Outpatient visit", Some(due))?;
//! engine.add_item_to_bill(&bill.id, "Consultation", Money::new(dec!(150), Currency::USD))?;
//! let payment = engine.process_payment(&bill.id, Money::new(dec!(150), Currency::USD), "CASH")?;
//! ```

pub mod allocator;
pub mod bill;
pub mod payment;
pub mod engine;
pub mod error;

pub use allocator::BillNumberAllocator;
pub use bill::{Bill, BillItem, BillStatus, DEFAULT_DUE_DAYS};
pub use payment::{Payment, PaymentStatus};
pub use engine::{BillingEngine, ReceivablesEntry, ReceivablesReport};
pub use error::BillingError;
