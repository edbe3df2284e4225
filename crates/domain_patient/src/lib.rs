//! Patient Domain - patient records and the patient directory
//!
//! This crate provides the `Patient` entity and the [`PatientDirectory`]
//! port that the billing engine consults when validating bill ownership.
//! The directory is a port so that implementations can be swapped: the
//! in-memory adapter here is the session-lifetime store the desktop
//! application owns, and tests can supply their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_patient::{InMemoryPatientDirectory, Patient, PatientDirectory};
//!
//! let directory = InMemoryPatientDirectory::new();
//! let id = directory.register(Patient::new("Amelia", "Reyes", dob))?;
//! assert!(directory.find_patient(&id).is_some());
//! ```

pub mod patient;
pub mod directory;
pub mod error;

pub use patient::Patient;
pub use directory::{PatientDirectory, InMemoryPatientDirectory};
pub use error::PatientError;
