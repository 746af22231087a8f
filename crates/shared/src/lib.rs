//! Shared identifiers, tenant scope, and configuration for Coopledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The organization/branch tenant scope
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, UnknownTypePolicy};
pub use types::TenantScope;
