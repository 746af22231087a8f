//! Ledger error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while resolving sign rules or aggregating entries.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Account type label has no sign rule.
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    /// Entry debit or credit is negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Date range ends before it starts.
    #[error("Invalid date range: {to} is before {from}")]
    InvalidDateRange {
        /// First day of the range.
        from: NaiveDate,
        /// Last day of the range.
        to: NaiveDate,
    },

    /// A balance or total left the representable range.
    #[error("Ledger amount overflow")]
    AmountOverflow,

    /// The ledger query collaborator failed.
    #[error("Ledger query failed: {0}")]
    Query(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAccountType(_) => "UNKNOWN_ACCOUNT_TYPE",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::Query(_) => "LEDGER_QUERY_FAILED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::UnknownAccountType(_)
            | Self::NegativeAmount
            | Self::InvalidDateRange { .. }
            | Self::AmountOverflow => 400,
            Self::Query(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::UnknownAccountType("X".into()).error_code(),
            "UNKNOWN_ACCOUNT_TYPE"
        );
        assert_eq!(LedgerError::NegativeAmount.error_code(), "NEGATIVE_AMOUNT");
        assert_eq!(LedgerError::AmountOverflow.error_code(), "AMOUNT_OVERFLOW");
        assert_eq!(LedgerError::Query("down".into()).error_code(), "LEDGER_QUERY_FAILED");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::NegativeAmount.http_status_code(), 400);
        assert_eq!(LedgerError::Query("down".into()).http_status_code(), 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::Query("down".into()).is_retryable());
        assert!(!LedgerError::NegativeAmount.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::InvalidDateRange {
            from: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: 2024-03-01 is before 2024-03-10"
        );
    }
}
