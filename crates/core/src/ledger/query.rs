//! Ledger query contract.
//!
//! The storage layer owns general ledger rows; this module only describes
//! how they are filtered and how the result feeds the aggregator.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use coopledger_shared::TenantScope;
use coopledger_shared::types::{
    AccountId, MemberProfileId, PaymentTypeId, TransactionBatchId, TransactionId, UserId,
};
use serde::{Deserialize, Serialize};

use super::balance::{BalanceAggregator, BalanceSummary};
use super::entry::LedgerEntry;
use super::error::LedgerError;

/// Origin of a general ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerSource {
    /// Teller withdrawal.
    Withdraw,
    /// Teller deposit.
    Deposit,
    /// General journal.
    Journal,
    /// Member payment.
    Payment,
    /// Adjustment entry.
    Adjustment,
    /// Journal voucher.
    #[serde(rename = "journal voucher")]
    JournalVoucher,
    /// Check voucher.
    #[serde(rename = "check voucher")]
    CheckVoucher,
    /// Loan release or amortization.
    Loan,
    /// Posted savings interest.
    #[serde(rename = "savings interest")]
    SavingsInterest,
    /// Mutual aid contribution.
    #[serde(rename = "mutual contribution")]
    MutualContribution,
}

impl LedgerSource {
    /// Every source.
    pub const ALL: [Self; 10] = [
        Self::Withdraw,
        Self::Deposit,
        Self::Journal,
        Self::Payment,
        Self::Adjustment,
        Self::JournalVoucher,
        Self::CheckVoucher,
        Self::Loan,
        Self::SavingsInterest,
        Self::MutualContribution,
    ];

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Withdraw => "withdraw",
            Self::Deposit => "deposit",
            Self::Journal => "journal",
            Self::Payment => "payment",
            Self::Adjustment => "adjustment",
            Self::JournalVoucher => "journal voucher",
            Self::CheckVoucher => "check voucher",
            Self::Loan => "loan",
            Self::SavingsInterest => "savings interest",
            Self::MutualContribution => "mutual contribution",
        }
    }
}

impl fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerSource {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| LedgerError::Query(format!("unknown ledger source: {s}")))
    }
}

/// Optional narrowing of a ledger query. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Only rows posted to this account.
    pub account_id: Option<AccountId>,
    /// Only rows for this member.
    pub member_profile_id: Option<MemberProfileId>,
    /// Only rows posted by this employee.
    pub employee_user_id: Option<UserId>,
    /// Only rows of this transaction.
    pub transaction_id: Option<TransactionId>,
    /// Only rows of this teller batch.
    pub transaction_batch_id: Option<TransactionBatchId>,
    /// Only rows paid with this payment type.
    pub payment_type_id: Option<PaymentTypeId>,
    /// Only rows from this source.
    pub source: Option<LedgerSource>,
    /// Skip rows posted to this account, usually cash on hand.
    pub exclude_account_id: Option<AccountId>,
}

impl LedgerFilter {
    /// A filter that matches everything in scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one account.
    #[must_use]
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Restricts to one member.
    #[must_use]
    pub fn member(mut self, member_profile_id: MemberProfileId) -> Self {
        self.member_profile_id = Some(member_profile_id);
        self
    }

    /// Restricts to one employee.
    #[must_use]
    pub fn employee(mut self, employee_user_id: UserId) -> Self {
        self.employee_user_id = Some(employee_user_id);
        self
    }

    /// Restricts to one transaction.
    #[must_use]
    pub fn transaction(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    /// Restricts to one teller batch.
    #[must_use]
    pub fn batch(mut self, transaction_batch_id: TransactionBatchId) -> Self {
        self.transaction_batch_id = Some(transaction_batch_id);
        self
    }

    /// Restricts to one payment type.
    #[must_use]
    pub fn payment_type(mut self, payment_type_id: PaymentTypeId) -> Self {
        self.payment_type_id = Some(payment_type_id);
        self
    }

    /// Restricts to one source.
    #[must_use]
    pub fn source(mut self, source: LedgerSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Excludes one account.
    #[must_use]
    pub fn excluding(mut self, account_id: AccountId) -> Self {
        self.exclude_account_id = Some(account_id);
        self
    }

    /// Returns true when no field narrows the query.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }
}

/// Read access to posted ledger rows.
///
/// Implemented by the db crate. Results are unordered.
pub trait LedgerQuery: Send + Sync {
    /// Returns every entry in `scope` that passes `filter`.
    fn find_entries(
        &self,
        scope: TenantScope,
        filter: &LedgerFilter,
    ) -> impl Future<Output = Result<Vec<LedgerEntry>, LedgerError>> + Send;
}

/// Queries entries and folds them into a summary.
///
/// # Errors
///
/// Returns the query's error, or [`LedgerError::AmountOverflow`] if the
/// totals leave the `Decimal` range.
pub async fn summarize<Q: LedgerQuery>(
    query: &Q,
    scope: TenantScope,
    filter: &LedgerFilter,
) -> Result<BalanceSummary, LedgerError> {
    let entries = query.find_entries(scope, filter).await?;
    BalanceAggregator::try_aggregate(&entries)
}
