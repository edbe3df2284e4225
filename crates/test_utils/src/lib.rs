//! Test Utilities
//!
//! Shared fixtures, builders, and proptest strategies for the hospital core
//! test suites. Depends only on `core_kernel` and `domain_patient` so the
//! billing crate can consume it as a dev-dependency without a cycle.

pub mod fixtures;
pub mod builders;
pub mod generators;

pub use fixtures::{DateFixtures, IdFixtures, MoneyFixtures};
pub use builders::{seeded_directory, TestPatientBuilder};
