//! `SeaORM` entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::general_ledger_entries::Entity as GeneralLedgerEntries;
pub use super::statement_definitions::Entity as StatementDefinitions;
pub use super::statement_groupings::Entity as StatementGroupings;
