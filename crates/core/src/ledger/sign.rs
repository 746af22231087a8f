//! Balance sign conventions.
//!
//! The table below is the single source of truth for how a debit or credit
//! moves the balance of each account classification:
//!
//! | Classification | Rule |
//! |---|---|
//! | Deposit, A/R-Ledger, A/R-Aging, SVF-Ledger, W-Off, Time Deposit | debit positive |
//! | Loan, Fines, Interest, A/P-Ledger | credit positive |
//! | Other | neutral |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coopledger_shared::UnknownTypePolicy;

use super::classification::{AccountClassification, GeneralLedgerType};
use super::error::LedgerError;

/// How an entry's debit and credit move a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignRule {
    /// balance += debit - credit
    DebitPositive,
    /// balance += credit - debit
    CreditPositive,
    /// balance is unaffected
    Neutral,
}

impl SignRule {
    /// Calculates the balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::DebitPositive => debit - credit,
            Self::CreditPositive => credit - debit,
            Self::Neutral => Decimal::ZERO,
        }
    }

    /// [`balance_change`](Self::balance_change), or `None` on overflow.
    #[must_use]
    pub fn checked_balance_change(self, debit: Decimal, credit: Decimal) -> Option<Decimal> {
        match self {
            Self::DebitPositive => debit.checked_sub(credit),
            Self::CreditPositive => credit.checked_sub(debit),
            Self::Neutral => Some(Decimal::ZERO),
        }
    }
}

/// Classification to rule table, derived from [`SignConvention::rule_for`].
const CLASSIFICATION_RULES: [(AccountClassification, SignRule); AccountClassification::ALL.len()] = {
    let mut table = [(AccountClassification::Other, SignRule::Neutral); AccountClassification::ALL.len()];
    let mut i = 0;
    while i < AccountClassification::ALL.len() {
        let classification = AccountClassification::ALL[i];
        table[i] = (classification, SignConvention::rule_for(classification));
        i += 1;
    }
    table
};

/// Static lookup of sign rules.
pub struct SignConvention;

impl SignConvention {
    /// Returns the sign rule for a classification.
    ///
    /// The match is exhaustive, so adding a classification without a rule
    /// fails to compile.
    #[must_use]
    pub const fn rule_for(classification: AccountClassification) -> SignRule {
        match classification {
            AccountClassification::Deposit
            | AccountClassification::ArLedger
            | AccountClassification::ArAging
            | AccountClassification::SvfLedger
            | AccountClassification::WriteOff
            | AccountClassification::TimeDeposit => SignRule::DebitPositive,
            AccountClassification::Loan
            | AccountClassification::Fines
            | AccountClassification::Interest
            | AccountClassification::ApLedger => SignRule::CreditPositive,
            AccountClassification::Other => SignRule::Neutral,
        }
    }

    /// The full table, for display and auditing.
    #[must_use]
    pub const fn table() -> &'static [(AccountClassification, SignRule)] {
        &CLASSIFICATION_RULES
    }

    /// Resolves a stored account type label.
    ///
    /// Labels outside the table resolve to [`SignRule::Neutral`] under
    /// [`UnknownTypePolicy::Neutral`] and fail under [`UnknownTypePolicy::Reject`].
    pub fn rule_for_label(label: &str, policy: UnknownTypePolicy) -> Result<SignRule, LedgerError> {
        match label.parse::<AccountClassification>() {
            Ok(classification) => Ok(Self::rule_for(classification)),
            Err(err) => match policy {
                UnknownTypePolicy::Neutral => Ok(SignRule::Neutral),
                UnknownTypePolicy::Reject => Err(err),
            },
        }
    }

    /// Returns the sign rule for a general ledger element.
    ///
    /// Assets and expenses are debit-normal; liabilities, equity and revenue
    /// are credit-normal.
    #[must_use]
    pub const fn rule_for_gl_type(gl_type: GeneralLedgerType) -> SignRule {
        match gl_type {
            GeneralLedgerType::Assets | GeneralLedgerType::Expenses => SignRule::DebitPositive,
            GeneralLedgerType::Liabilities
            | GeneralLedgerType::Equity
            | GeneralLedgerType::Revenue => SignRule::CreditPositive,
        }
    }
}
