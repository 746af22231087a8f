//! Daily ending balances.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::sign::SignConvention;

/// Balance at the end of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBalance {
    /// The day.
    pub date: NaiveDate,
    /// Balance after every entry dated on or before `date`.
    pub balance: Decimal,
}

/// Computes one ending balance per day in `[from, to]`.
///
/// Entries dated before `from` roll into the first day's balance; entries
/// after `to` are ignored. Days without entries carry the previous balance
/// forward.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidDateRange`] if `to` is before `from`, or
/// [`LedgerError::AmountOverflow`] if a balance leaves the `Decimal` range.
pub fn daily_ending_balances(
    opening: Decimal,
    entries: &[LedgerEntry],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyBalance>, LedgerError> {
    if to < from {
        return Err(LedgerError::InvalidDateRange { from, to });
    }

    let mut changes: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for entry in entries.iter().filter(|entry| entry.entry_date <= to) {
        let change = SignConvention::rule_for(entry.classification)
            .checked_balance_change(entry.debit, entry.credit)
            .ok_or(LedgerError::AmountOverflow)?;
        let day = changes.entry(entry.entry_date).or_insert(Decimal::ZERO);
        *day = day.checked_add(change).ok_or(LedgerError::AmountOverflow)?;
    }

    let mut balance = changes
        .range(..from)
        .try_fold(opening, |balance, (_, change)| balance.checked_add(*change))
        .ok_or(LedgerError::AmountOverflow)?;

    let mut balances = Vec::new();
    for date in from.iter_days().take_while(|day| *day <= to) {
        if let Some(change) = changes.get(&date) {
            balance = balance
                .checked_add(*change)
                .ok_or(LedgerError::AmountOverflow)?;
        }
        balances.push(DailyBalance { date, balance });
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coopledger_shared::types::AccountId;
    use rust_decimal_macros::dec;

    use crate::ledger::classification::AccountClassification;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn deposit(date: NaiveDate, debit: Decimal, credit: Decimal) -> LedgerEntry {
        LedgerEntry::new(
            AccountId::new(),
            AccountClassification::Deposit,
            debit,
            credit,
            date,
        )
    }

    #[test]
    fn test_balances_carry_forward() {
        let entries = vec![
            deposit(day(2), dec!(100), dec!(0)),
            deposit(day(4), dec!(0), dec!(40)),
        ];

        let balances = daily_ending_balances(dec!(10), &entries, day(1), day(5)).unwrap();

        let values: Vec<_> = balances.iter().map(|b| b.balance).collect();
        assert_eq!(values, vec![dec!(10), dec!(110), dec!(110), dec!(70), dec!(70)]);
        assert_eq!(balances[0].date, day(1));
        assert_eq!(balances[4].date, day(5));
    }

    #[test]
    fn test_entries_before_range_roll_into_first_day() {
        let entries = vec![
            deposit(day(1), dec!(50), dec!(0)),
            deposit(day(3), dec!(5), dec!(0)),
        ];

        let balances = daily_ending_balances(Decimal::ZERO, &entries, day(3), day(3)).unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, dec!(55));
    }

    #[test]
    fn test_entries_after_range_are_ignored() {
        let entries = vec![deposit(day(9), dec!(50), dec!(0))];

        let balances = daily_ending_balances(Decimal::ZERO, &entries, day(1), day(2)).unwrap();

        assert!(balances.iter().all(|b| b.balance.is_zero()));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result = daily_ending_balances(Decimal::ZERO, &[], day(5), day(1));
        assert!(matches!(
            result,
            Err(LedgerError::InvalidDateRange { from, to }) if from == day(5) && to == day(1)
        ));
    }

    #[test]
    fn test_overflowing_balance_is_an_error() {
        let entries = vec![deposit(day(1), Decimal::MAX, dec!(0))];

        let result = daily_ending_balances(dec!(1), &entries, day(1), day(2));

        assert!(matches!(result, Err(LedgerError::AmountOverflow)));
    }
}
