//! Composer Links - source link validation
//!
//! Sweeps research source URLs one at a time, classifying each as valid,
//! invalid or a competitor domain.

#![forbid(unsafe_code)]

pub mod blocklist;
pub mod error;
pub mod validator;

pub use blocklist::{CompetitorBlocklist, DEFAULT_COMPETITORS};
pub use error::ValidatorError;
pub use validator::{LinkValidator, ValidationResult, ValidatorConfig};
