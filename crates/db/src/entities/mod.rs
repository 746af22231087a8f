//! `SeaORM` entities.

pub mod prelude;

pub mod accounts;
pub mod general_ledger_entries;
pub mod sea_orm_active_enums;
pub mod statement_definitions;
pub mod statement_groupings;
