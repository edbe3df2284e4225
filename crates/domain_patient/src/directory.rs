//! Patient directory port and in-memory adapter
//!
//! The billing engine validates bill ownership against a `PatientDirectory`.
//! The port is synchronous: nothing in this system suspends or performs I/O,
//! so a lookup is a plain function call. Adapters can be swapped — the
//! in-memory adapter below is the session-lifetime store, and tests may
//! provide their own implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use core_kernel::PatientId;

use crate::error::PatientError;
use crate::patient::Patient;

/// Lookup interface consumed by billing
///
/// Consulted only at bill-creation time; later operations against an
/// existing bill do not re-check the patient.
pub trait PatientDirectory: Send + Sync {
    /// Returns the patient with the given id, or `None` if absent
    fn find_patient(&self, id: &PatientId) -> Option<Patient>;
}

/// In-memory, session-lifetime patient store
#[derive(Debug, Default)]
pub struct InMemoryPatientDirectory {
    patients: RwLock<HashMap<PatientId, Patient>>,
}

impl InMemoryPatientDirectory {
    /// Creates an empty directory
    pub fn new() -> Self {
        Self {
            patients: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a patient record
    ///
    /// # Errors
    ///
    /// - `Validation` if the record fails the registration rules
    /// - `Duplicate` if a patient with the same id is already registered
    pub fn register(&self, patient: Patient) -> Result<PatientId, PatientError> {
        patient.check_valid()?;

        let mut patients = self.patients.write().unwrap_or_else(|e| e.into_inner());
        if patients.contains_key(&patient.id) {
            return Err(PatientError::Duplicate(patient.id.to_string()));
        }

        let id = patient.id;
        patients.insert(id, patient);
        Ok(id)
    }

    /// Marks a patient record inactive
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such patient is registered.
    pub fn deactivate(&self, id: &PatientId) -> Result<(), PatientError> {
        let mut patients = self.patients.write().unwrap_or_else(|e| e.into_inner());
        let patient = patients
            .get_mut(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;

        patient.is_active = false;
        patient.updated_at = Utc::now();
        Ok(())
    }

    /// Returns all registered patients
    pub fn all_patients(&self) -> Vec<Patient> {
        let patients = self.patients.read().unwrap_or_else(|e| e.into_inner());
        patients.values().cloned().collect()
    }

    /// Number of registered patients
    pub fn len(&self) -> usize {
        let patients = self.patients.read().unwrap_or_else(|e| e.into_inner());
        patients.len()
    }

    /// Returns true if no patients are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PatientDirectory for InMemoryPatientDirectory {
    fn find_patient(&self, id: &PatientId) -> Option<Patient> {
        let patients = self.patients.read().unwrap_or_else(|e| e.into_inner());
        patients.get(id).cloned()
    }
}
