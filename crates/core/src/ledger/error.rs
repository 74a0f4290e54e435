//! Ledger error types for input validation and document state errors.
//!
//! Fetch failures and unmatched entries are not errors: they are reported as
//! diagnostics by the operations that meet them.

use apunta_shared::AppError;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Input Validation Errors ==========
    /// Entry date is not a `YYYY-MM-DD` date.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Entry amount is not a decimal number.
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    /// Currency code is malformed.
    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    /// Entry has no payer.
    #[error("Entry payer cannot be empty")]
    EmptyPayer,

    /// Month group name is empty.
    #[error("Month group name cannot be empty")]
    EmptyGroupName,

    // ========== Month Errors ==========
    /// Another month already uses this group name.
    #[error("A month named '{0}' already exists")]
    DuplicateMonthName(String),

    /// Another month already covers this calendar month.
    #[error("A month starting {0} already exists")]
    DuplicatePeriod(NaiveDate),

    /// No month with this group name.
    #[error("Month not found: {0}")]
    MonthNotFound(String),

    /// No month is marked active.
    #[error("No month is marked active")]
    NoActiveMonth,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidCurrency(_) => "INVALID_CURRENCY",
            Self::EmptyPayer => "EMPTY_PAYER",
            Self::EmptyGroupName => "EMPTY_GROUP_NAME",
            Self::DuplicateMonthName(_) => "DUPLICATE_MONTH_NAME",
            Self::DuplicatePeriod(_) => "DUPLICATE_PERIOD",
            Self::MonthNotFound(_) => "MONTH_NOT_FOUND",
            Self::NoActiveMonth => "NO_ACTIVE_MONTH",
        }
    }

    /// Returns true for errors caused by malformed user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate(_)
                | Self::InvalidAmount(_)
                | Self::InvalidCurrency(_)
                | Self::EmptyPayer
                | Self::EmptyGroupName
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidDate(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::InvalidCurrency(_)
            | LedgerError::EmptyPayer
            | LedgerError::EmptyGroupName => Self::Validation(message),
            LedgerError::DuplicateMonthName(_) | LedgerError::DuplicatePeriod(_) => {
                Self::Conflict(message)
            }
            LedgerError::MonthNotFound(_) => Self::NotFound(message),
            LedgerError::NoActiveMonth => Self::BusinessRule(message),
        }
    }
}
