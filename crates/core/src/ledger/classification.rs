//! Account classifications used by the cooperative chart of accounts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use coopledger_shared::UnknownTypePolicy;

use super::error::LedgerError;

/// Operational classification of an account.
///
/// The serialized labels are the ones stored on account records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountClassification {
    /// Member savings deposits.
    #[serde(rename = "Deposit")]
    Deposit,
    /// Member loans receivable.
    #[serde(rename = "Loan")]
    Loan,
    /// Accounts receivable ledger.
    #[serde(rename = "A/R-Ledger")]
    ArLedger,
    /// Accounts receivable aging.
    #[serde(rename = "A/R-Aging")]
    ArAging,
    /// Penalties and fines.
    #[serde(rename = "Fines")]
    Fines,
    /// Interest income.
    #[serde(rename = "Interest")]
    Interest,
    /// Special voluntary fund ledger.
    #[serde(rename = "SVF-Ledger")]
    SvfLedger,
    /// Written-off balances.
    #[serde(rename = "W-Off")]
    WriteOff,
    /// Accounts payable ledger.
    #[serde(rename = "A/P-Ledger")]
    ApLedger,
    /// Anything else; carries no member balance.
    #[serde(rename = "Other")]
    Other,
    /// Time deposits.
    #[serde(rename = "Time Deposit")]
    TimeDeposit,
}

impl AccountClassification {
    /// Every classification, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Deposit,
        Self::Loan,
        Self::ArLedger,
        Self::ArAging,
        Self::Fines,
        Self::Interest,
        Self::SvfLedger,
        Self::WriteOff,
        Self::ApLedger,
        Self::Other,
        Self::TimeDeposit,
    ];

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Loan => "Loan",
            Self::ArLedger => "A/R-Ledger",
            Self::ArAging => "A/R-Aging",
            Self::Fines => "Fines",
            Self::Interest => "Interest",
            Self::SvfLedger => "SVF-Ledger",
            Self::WriteOff => "W-Off",
            Self::ApLedger => "A/P-Ledger",
            Self::Other => "Other",
            Self::TimeDeposit => "Time Deposit",
        }
    }

    /// Parses a stored label, applying the unknown-type policy.
    ///
    /// Under [`UnknownTypePolicy::Neutral`] an unknown label resolves to
    /// [`Self::Other`], which carries no balance.
    pub fn resolve(label: &str, policy: UnknownTypePolicy) -> Result<Self, LedgerError> {
        match (label.parse(), policy) {
            (Ok(classification), _) => Ok(classification),
            (Err(_), UnknownTypePolicy::Neutral) => Ok(Self::Other),
            (Err(err), UnknownTypePolicy::Reject) => Err(err),
        }
    }
}

impl fmt::Display for AccountClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountClassification {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|classification| classification.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownAccountType(s.to_string()))
    }
}

/// Accounting element of a general ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneralLedgerType {
    /// Assets.
    Assets,
    /// Liabilities.
    Liabilities,
    /// Equity.
    Equity,
    /// Revenue.
    Revenue,
    /// Expenses.
    Expenses,
}

impl GeneralLedgerType {
    /// Every general ledger type.
    pub const ALL: [Self; 5] = [
        Self::Assets,
        Self::Liabilities,
        Self::Equity,
        Self::Revenue,
        Self::Expenses,
    ];

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assets => "Assets",
            Self::Liabilities => "Liabilities",
            Self::Equity => "Equity",
            Self::Revenue => "Revenue",
            Self::Expenses => "Expenses",
        }
    }
}

impl FromStr for GeneralLedgerType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gl_type| gl_type.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownAccountType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Deposit", AccountClassification::Deposit)]
    #[case("A/R-Ledger", AccountClassification::ArLedger)]
    #[case("A/R-Aging", AccountClassification::ArAging)]
    #[case("SVF-Ledger", AccountClassification::SvfLedger)]
    #[case("W-Off", AccountClassification::WriteOff)]
    #[case("A/P-Ledger", AccountClassification::ApLedger)]
    #[case("Time Deposit", AccountClassification::TimeDeposit)]
    fn test_parse_stored_labels(#[case] label: &str, #[case] expected: AccountClassification) {
        assert_eq!(label.parse::<AccountClassification>().unwrap(), expected);
        assert_eq!(expected.to_string(), label);
    }

    #[test]
    fn test_labels_round_trip() {
        for classification in AccountClassification::ALL {
            assert_eq!(
                classification.as_str().parse::<AccountClassification>().unwrap(),
                classification
            );
        }
    }

    #[test]
    fn test_serde_uses_stored_labels() {
        let json = serde_json::to_string(&AccountClassification::TimeDeposit).unwrap();
        assert_eq!(json, "\"Time Deposit\"");

        let parsed: AccountClassification = serde_json::from_str("\"A/P-Ledger\"").unwrap();
        assert_eq!(parsed, AccountClassification::ApLedger);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "Savings".parse::<AccountClassification>().unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccountType(ref label) if label == "Savings"));
    }

    #[test]
    fn test_resolve_applies_policy() {
        assert_eq!(
            AccountClassification::resolve("Share Capital", UnknownTypePolicy::Neutral).unwrap(),
            AccountClassification::Other
        );
        assert!(AccountClassification::resolve("Share Capital", UnknownTypePolicy::Reject).is_err());
        assert_eq!(
            AccountClassification::resolve("Fines", UnknownTypePolicy::Reject).unwrap(),
            AccountClassification::Fines
        );
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("deposit".parse::<AccountClassification>().is_err());
    }

    #[test]
    fn test_general_ledger_type_labels() {
        for gl_type in GeneralLedgerType::ALL {
            assert_eq!(gl_type.as_str().parse::<GeneralLedgerType>().unwrap(), gl_type);
        }
        assert!("Income".parse::<GeneralLedgerType>().is_err());
    }
}
