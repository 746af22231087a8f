//! Statement hierarchy maintenance.
//!
//! Financial statement and general ledger reports are trees of
//! definitions placed in groupings, with accounts listed under
//! definitions. This module keeps their manual orderings contiguous and
//! enforces the linking and deletion rules:
//!
//! - `ordering` - the generic sibling reorder primitive
//! - `tree` - tenant-safe linking and deletion checks
//! - `service` - the transactional, per-parent serialized API
//! - `store` / `memory` - the persistence contract and an in-memory store

pub mod error;
pub mod locks;
pub mod memory;
pub mod ordering;
pub mod service;
pub mod store;
pub mod tree;
pub mod types;

#[cfg(test)]
mod ordering_props;

pub use error::{DependentKind, EntityRef, HierarchyError, StoreError};
pub use locks::{ParentGuard, ParentLocks};
pub use memory::{InMemoryHierarchyStore, InMemoryTransaction};
pub use ordering::{OrderedSiblingList, Reordered, SiblingAccess, SiblingIndex, reorder};
pub use service::HierarchyService;
pub use store::{HierarchyStore, HierarchyTransaction};
pub use tree::StatementTree;
pub use types::{
    Account, AccountMembership, DEFINITIONS_IN_GROUPING, DefinitionShape, HierarchyKind,
    ParentKey, StatementDefinition, StatementGrouping,
};
