//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about; everything else is
//! generated realistically.

use std::sync::Arc;

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

use core_kernel::PatientId;
use domain_patient::{InMemoryPatientDirectory, Patient};

use crate::fixtures::DateFixtures;

/// Builder for constructing test patients
pub struct TestPatientBuilder {
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    email: Option<String>,
}

impl Default for TestPatientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPatientBuilder {
    /// Creates a builder with generated demographics
    pub fn new() -> Self {
        Self {
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            date_of_birth: DateFixtures::adult_date_of_birth(),
            email: Some(SafeEmail().fake()),
        }
    }

    /// Sets the first name
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = name.into();
        self
    }

    /// Sets the last name
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = name.into();
        self
    }

    /// Sets the date of birth
    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    /// Sets the contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Clears the contact email
    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    /// Builds the patient record
    pub fn build(self) -> Patient {
        let mut patient = Patient::new(self.first_name, self.last_name, self.date_of_birth);
        if let Some(email) = self.email {
            patient = patient.with_email(email);
        }
        patient
    }
}

/// Creates a directory holding `count` generated patients
///
/// Returns the directory and the registered ids in registration order.
pub fn seeded_directory(count: usize) -> (Arc<InMemoryPatientDirectory>, Vec<PatientId>) {
    let directory = Arc::new(InMemoryPatientDirectory::new());

    let ids = (0..count)
        .map(|_| {
            directory
                .register(TestPatientBuilder::new().build())
                .expect("generated patient should be valid")
        })
        .collect();

    (directory, ids)
}
