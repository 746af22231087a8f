//! Core business logic for Coopledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! It never logs: failures are returned as typed errors for the caller to
//! report.
//!
//! # Modules
//!
//! - `ledger` - Sign conventions and balance aggregation over ledger entries
//! - `hierarchy` - Ordering, linking and deletion rules for statement trees

pub mod hierarchy;
pub mod ledger;
