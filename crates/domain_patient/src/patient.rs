//! Patient entity
//!
//! A `Patient` is the person a bill is owned by. Billing only needs
//! existence and identity; the demographic fields are what the wider
//! back-office (registration, scheduling) records about the person.
//!
//! # Validation Rules
//!
//! - Must have first name and last name
//! - Date of birth must be in the past
//! - Email, when present, must be well-formed

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PatientId;

use crate::error::PatientError;

/// A registered patient
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Patient {
    /// Unique identifier
    pub id: PatientId,
    /// Given name
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    /// Family name
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Contact email
    #[validate(email(message = "email is not well-formed"))]
    pub email: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Whether the patient record is active
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Creates a new active patient record
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PatientId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            email: None,
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the contact phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Returns the patient's display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the patient's age in whole years as of today
    pub fn age(&self) -> i32 {
        let today = Utc::now().date_naive();
        let mut age = today.year() - self.date_of_birth.year();
        if (today.month(), today.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
            age -= 1;
        }
        age
    }

    /// Checks the record against the registration rules
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` describing the first failed rule.
    pub fn check_valid(&self) -> Result<(), PatientError> {
        self.validate()
            .map_err(|e| PatientError::Validation(e.to_string()))?;

        if self.date_of_birth >= Utc::now().date_naive() {
            return Err(PatientError::validation("date of birth must be in the past"));
        }

        Ok(())
    }
}
