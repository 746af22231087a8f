//! Ledger entry domain types.

use chrono::NaiveDate;
use coopledger_shared::types::{AccountId, LedgerEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classification::AccountClassification;
use super::error::LedgerError;

/// A single posted debit/credit movement against one account.
///
/// Entries are append-only and owned by the ledger store; this crate only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The account affected by this entry.
    pub account_id: AccountId,
    /// Classification of the account at posting time.
    pub classification: AccountClassification,
    /// Debit amount (non-negative).
    pub debit: Decimal,
    /// Credit amount (non-negative).
    pub credit: Decimal,
    /// Business date of the entry.
    pub entry_date: NaiveDate,
}

impl LedgerEntry {
    /// Creates an entry with a fresh id.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        classification: AccountClassification,
        debit: Decimal,
        credit: Decimal,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            account_id,
            classification,
            debit,
            credit,
            entry_date,
        }
    }

    /// Checks the non-negative amount precondition.
    ///
    /// The aggregator does not call this; it is offered to the layer that
    /// accepts entries from the outside.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.debit < Decimal::ZERO || self.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(debit: Decimal, credit: Decimal) -> LedgerEntry {
        LedgerEntry::new(
            AccountId::new(),
            AccountClassification::Deposit,
            debit,
            credit,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_validate_accepts_non_negative_amounts() {
        assert!(entry(dec!(100), dec!(0)).validate().is_ok());
        assert!(entry(dec!(0), dec!(0)).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        assert!(matches!(
            entry(dec!(-1), dec!(0)).validate(),
            Err(LedgerError::NegativeAmount)
        ));
        assert!(matches!(
            entry(dec!(0), dec!(-0.01)).validate(),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_validate_accepts_negative_zero() {
        let mut e = entry(dec!(0), dec!(0));
        e.debit.set_sign_negative(true);
        assert!(e.validate().is_ok());
    }
}
