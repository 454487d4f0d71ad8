//! Error types for maintcal.

use chrono::NaiveDate;
use thiserror::Error;

use crate::obligation::ObligationId;

/// Errors that can surface from maintcal operations.
///
/// Malformed stored data (bad anchor dates, unknown frequencies) is not an
/// error: it degrades the affected obligation to "no occurrences" instead.
#[derive(Error, Debug)]
pub enum MaintCalError {
    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid obligation id '{0}'. Expected pm-<n> or calibration-<n>")]
    InvalidObligationId(String),

    #[error("Obligation not found: {0}")]
    ObligationNotFound(ObligationId),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MaintCalError {
    /// True for errors caused by the caller's input rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MaintCalError::InvalidWindow { .. }
                | MaintCalError::InvalidDate(_)
                | MaintCalError::InvalidObligationId(_)
        )
    }
}

/// Result type alias for maintcal operations.
pub type MaintCalResult<T> = Result<T, MaintCalError>;
