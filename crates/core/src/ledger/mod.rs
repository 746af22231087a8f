//! Ledger balance logic.
//!
//! - Account classifications and general ledger types
//! - Sign conventions (one rule per classification)
//! - Balance aggregation, batch merge and parallel folds
//! - Daily ending balances
//! - The ledger query contract implemented by the storage layer

pub mod balance;
pub mod classification;
pub mod daily;
pub mod entry;
pub mod error;
pub mod query;
pub mod sign;

#[cfg(test)]
mod balance_props;

pub use balance::{BalanceAggregator, BalanceSummary};
pub use classification::{AccountClassification, GeneralLedgerType};
pub use daily::{DailyBalance, daily_ending_balances};
pub use entry::LedgerEntry;
pub use error::LedgerError;
pub use query::{LedgerFilter, LedgerQuery, LedgerSource, summarize};
pub use sign::{SignConvention, SignRule};
