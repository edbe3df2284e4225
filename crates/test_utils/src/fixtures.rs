//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common value types. Fixtures are consistent
//! and predictable so assertions can use literal expectations.

use chrono::{Days, NaiveDate, Utc};
use core_kernel::{BillId, Currency, Money, PatientId, PaymentId};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard consultation fee
    pub fn usd_consultation() -> Money {
        Money::new(dec!(150.00), Currency::USD)
    }

    /// A standard imaging fee
    pub fn usd_xray() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// A small partial payment
    pub fn usd_partial_payment() -> Money {
        Money::new(dec!(40.00), Currency::USD)
    }

    /// A zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    /// Today's date
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// A due date thirty days out
    pub fn due_in_30_days() -> NaiveDate {
        Self::today() + Days::new(30)
    }

    /// Yesterday, for due-date-in-the-past rejections
    pub fn yesterday() -> NaiveDate {
        Self::today() - Days::new(1)
    }

    /// A date of birth for an adult patient
    pub fn adult_date_of_birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1984, 6, 15).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A fresh patient id that no directory knows about
    pub fn unknown_patient_id() -> PatientId {
        PatientId::new()
    }

    /// A fresh payment id that no engine knows about
    pub fn unknown_payment_id() -> PaymentId {
        PaymentId::new()
    }

    /// A bill id that no engine allocated
    pub fn unknown_bill_id() -> BillId {
        BillId::from_sequence(1)
    }
}
