//! Patient domain errors

use thiserror::Error;

/// Errors that can occur in the patient domain
#[derive(Debug, Error)]
pub enum PatientError {
    /// Record fails a registration rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// No patient with the given id is registered
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// A patient with the same id is already registered
    #[error("Patient already registered: {0}")]
    Duplicate(String),
}

impl PatientError {
    pub fn validation(message: impl Into<String>) -> Self {
        PatientError::Validation(message.into())
    }
}
