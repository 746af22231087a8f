//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod chart;
pub mod hierarchy;
pub mod ledger;

pub use chart::{
    ChartError, ChartRepository, CreateAccountInput, CreateDefinitionInput, PostEntryInput,
};
pub use hierarchy::{SeaHierarchyStore, SeaHierarchyTransaction};
pub use ledger::SeaLedgerQuery;
