//! Property-based tests for balance aggregation.

use chrono::NaiveDate;
use coopledger_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BalanceAggregator, BalanceSummary};
use super::classification::AccountClassification;
use super::entry::LedgerEntry;
use super::sign::{SignConvention, SignRule};

/// Amounts from 0.00 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn classification() -> impl Strategy<Value = AccountClassification> {
    prop::sample::select(AccountClassification::ALL.to_vec())
}

fn entry() -> impl Strategy<Value = LedgerEntry> {
    (classification(), amount(), amount()).prop_map(|(classification, debit, credit)| {
        LedgerEntry::new(
            AccountId::new(),
            classification,
            debit,
            credit,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    })
}

fn entries() -> impl Strategy<Value = Vec<LedgerEntry>> {
    prop::collection::vec(entry(), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any permutation of the input yields the same summary.
    #[test]
    fn prop_order_independent(shuffled in entries().prop_shuffle(), seed in any::<u64>()) {
        let mut reversed = shuffled.clone();
        reversed.reverse();
        let mut rotated = shuffled.clone();
        if !rotated.is_empty() {
            let by = usize::try_from(seed % rotated.len() as u64).unwrap_or(0);
            rotated.rotate_left(by);
        }

        let expected = BalanceAggregator::aggregate(&shuffled);
        prop_assert_eq!(BalanceAggregator::aggregate(&reversed), expected);
        prop_assert_eq!(BalanceAggregator::aggregate(&rotated), expected);
    }

    /// Aggregating two batches and merging equals aggregating their concatenation.
    #[test]
    fn prop_batches_merge(left in entries(), right in entries()) {
        let mut all = left.clone();
        all.extend(right.iter().cloned());

        let merged = BalanceAggregator::aggregate(&left).merge(BalanceAggregator::aggregate(&right));
        prop_assert_eq!(merged, BalanceAggregator::aggregate(&all));
    }

    /// Each classification contributes according to its sign rule.
    #[test]
    fn prop_contribution_follows_rule(entry in entry()) {
        let summary = BalanceAggregator::aggregate(std::slice::from_ref(&entry));
        let expected = match SignConvention::rule_for(entry.classification) {
            SignRule::DebitPositive => entry.debit - entry.credit,
            SignRule::CreditPositive => entry.credit - entry.debit,
            SignRule::Neutral => Decimal::ZERO,
        };
        prop_assert_eq!(summary.balance, expected);
        prop_assert_eq!(summary.total_debit, entry.debit);
        prop_assert_eq!(summary.total_credit, entry.credit);
    }

    /// Totals ignore the sign rule.
    #[test]
    fn prop_totals_are_raw_sums(entries in entries()) {
        let summary = BalanceAggregator::aggregate(&entries);
        let debit: Decimal = entries.iter().map(|e| e.debit).sum();
        let credit: Decimal = entries.iter().map(|e| e.credit).sum();
        prop_assert_eq!(summary.total_debit, debit);
        prop_assert_eq!(summary.total_credit, credit);
    }

    /// The rayon fold matches the sequential one.
    #[test]
    fn prop_parallel_matches_sequential(entries in entries()) {
        prop_assert_eq!(
            BalanceAggregator::par_aggregate(&entries),
            BalanceAggregator::aggregate(&entries)
        );
    }

    /// Summing per-entry summaries equals aggregating the whole set.
    #[test]
    fn prop_sum_of_singletons(entries in entries()) {
        let summed: BalanceSummary = entries
            .iter()
            .map(|e| BalanceAggregator::aggregate(std::slice::from_ref(e)))
            .sum();
        prop_assert_eq!(summed, BalanceAggregator::aggregate(&entries));
    }
}
