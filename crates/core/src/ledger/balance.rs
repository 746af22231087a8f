//! Balance aggregation.
//!
//! Folds ledger entries into a [`BalanceSummary`] using the sign rules from
//! [`SignConvention`]. Aggregation is a commutative monoid: summaries of
//! disjoint batches can be merged in any order and give the same result as a
//! single pass over the concatenated input.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classification::AccountClassification;
use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::sign::{SignConvention, SignRule};

/// Signed balance plus raw debit and credit totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Net signed balance.
    pub balance: Decimal,
    /// Sum of all debits, regardless of sign rule.
    pub total_debit: Decimal,
    /// Sum of all credits, regardless of sign rule.
    pub total_credit: Decimal,
}

impl BalanceSummary {
    /// The empty summary.
    pub const ZERO: Self = Self {
        balance: Decimal::ZERO,
        total_debit: Decimal::ZERO,
        total_credit: Decimal::ZERO,
    };

    /// Adds one debit/credit pair under the given rule.
    ///
    /// # Panics
    ///
    /// Panics if a total leaves the `Decimal` range. Amounts stored as
    /// `NUMERIC(19,4)` stay far below it; use
    /// [`try_accumulate`](Self::try_accumulate) for unbounded input.
    pub fn accumulate(&mut self, rule: SignRule, debit: Decimal, credit: Decimal) {
        self.balance += rule.balance_change(debit, credit);
        self.total_debit += debit;
        self.total_credit += credit;
    }

    /// Adds one debit/credit pair, leaving `self` untouched on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if any total overflows.
    pub fn try_accumulate(
        &mut self,
        rule: SignRule,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<(), LedgerError> {
        let change = rule
            .checked_balance_change(debit, credit)
            .ok_or(LedgerError::AmountOverflow)?;
        *self = self
            .checked_merge(Self {
                balance: change,
                total_debit: debit,
                total_credit: credit,
            })
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(())
    }

    /// [`merge`](Self::merge), or `None` if any total overflows.
    #[must_use]
    pub fn checked_merge(self, other: Self) -> Option<Self> {
        Some(Self {
            balance: self.balance.checked_add(other.balance)?,
            total_debit: self.total_debit.checked_add(other.total_debit)?,
            total_credit: self.total_credit.checked_add(other.total_credit)?,
        })
    }

    /// Combines two partial summaries.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            balance: self.balance + other.balance,
            total_debit: self.total_debit + other.total_debit,
            total_credit: self.total_credit + other.total_credit,
        }
    }
}

impl Add for BalanceSummary {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.merge(rhs)
    }
}

impl AddAssign for BalanceSummary {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.merge(rhs);
    }
}

impl Sum for BalanceSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::merge)
    }
}

impl<'a> Sum<&'a BalanceSummary> for BalanceSummary {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Stateless entry folder.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Aggregates entries using the classification sign table.
    ///
    /// Pure and order independent. Negative amounts are not rejected here;
    /// see [`LedgerEntry::validate`].
    ///
    /// # Panics
    ///
    /// Panics on `Decimal` overflow, which needs totals near 7.9e28. Use
    /// [`try_aggregate`](Self::try_aggregate) when amounts are not bounded
    /// by the ledger column type.
    pub fn aggregate<'a, I>(entries: I) -> BalanceSummary
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        Self::aggregate_by(entries, |entry| SignConvention::rule_for(entry.classification))
    }

    /// Fallible [`aggregate`](Self::aggregate).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if a total leaves the
    /// `Decimal` range.
    pub fn try_aggregate<'a, I>(entries: I) -> Result<BalanceSummary, LedgerError>
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        entries
            .into_iter()
            .try_fold(BalanceSummary::ZERO, |mut summary, entry| {
                summary.try_accumulate(
                    SignConvention::rule_for(entry.classification),
                    entry.debit,
                    entry.credit,
                )?;
                Ok(summary)
            })
    }

    /// Aggregates entries with a caller-supplied rule resolver.
    ///
    /// Used to fold totals by general ledger type, or to apply an
    /// account-type policy resolved outside the entry.
    pub fn aggregate_by<'a, I, F>(entries: I, mut rule: F) -> BalanceSummary
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
        F: FnMut(&LedgerEntry) -> SignRule,
    {
        entries
            .into_iter()
            .fold(BalanceSummary::ZERO, |mut summary, entry| {
                summary.accumulate(rule(entry), entry.debit, entry.credit);
                summary
            })
    }

    /// Aggregates a single classification's raw amounts.
    #[must_use]
    pub fn contribution(
        classification: AccountClassification,
        debit: Decimal,
        credit: Decimal,
    ) -> BalanceSummary {
        let mut summary = BalanceSummary::ZERO;
        summary.accumulate(SignConvention::rule_for(classification), debit, credit);
        summary
    }

    /// Parallel [`aggregate`](Self::aggregate) for large slices.
    ///
    /// Gives the same result as the sequential fold.
    #[must_use]
    pub fn par_aggregate(entries: &[LedgerEntry]) -> BalanceSummary {
        entries
            .par_iter()
            .map(|entry| Self::contribution(entry.classification, entry.debit, entry.credit))
            .reduce(|| BalanceSummary::ZERO, BalanceSummary::merge)
    }
}
