//! `SeaORM` mappings for Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "hierarchy_kind")]
pub enum HierarchyKind {
    #[sea_orm(string_value = "financial_statement")]
    FinancialStatement,
    #[sea_orm(string_value = "general_ledger")]
    GeneralLedger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "general_ledger_type")]
pub enum GeneralLedgerType {
    #[sea_orm(string_value = "Assets")]
    Assets,
    #[sea_orm(string_value = "Liabilities")]
    Liabilities,
    #[sea_orm(string_value = "Equity")]
    Equity,
    #[sea_orm(string_value = "Revenue")]
    Revenue,
    #[sea_orm(string_value = "Expenses")]
    Expenses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_source")]
pub enum LedgerSource {
    #[sea_orm(string_value = "withdraw")]
    Withdraw,
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "journal")]
    Journal,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "journal voucher")]
    JournalVoucher,
    #[sea_orm(string_value = "check voucher")]
    CheckVoucher,
    #[sea_orm(string_value = "loan")]
    Loan,
    #[sea_orm(string_value = "savings interest")]
    SavingsInterest,
    #[sea_orm(string_value = "mutual contribution")]
    MutualContribution,
}
