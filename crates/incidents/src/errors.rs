use thiserror::Error;

use crate::models::ReportStatus;

/// Constraint violations raised while constructing domain documents.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid phone number: {0} (expected 10 digits starting with 6-9)")]
    InvalidPhone(String),

    #[error("Field `{field}` out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Field `{field}` has more than {decimals} decimal places: {value}")]
    Precision {
        field: &'static str,
        value: f64,
        decimals: u32,
    },

    #[error("Report text has {0} words, expected 5 to 15")]
    WordCount(usize),

    #[error("Report with status `{0}` cannot carry a verifier")]
    UnexpectedVerifier(ReportStatus),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}
