//! Hierarchy error types.

use std::fmt;

use coopledger_shared::types::{AccountId, DefinitionId, GroupingId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::HierarchyKind;

/// Why a definition cannot be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependentKind {
    /// The definition has child entries.
    SubEntries,
    /// At least one account is linked to the definition.
    LinkedAccounts,
}

impl fmt::Display for DependentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubEntries => f.write_str("sub entries"),
            Self::LinkedAccounts => f.write_str("linked accounts"),
        }
    }
}

/// A reference to a stored hierarchy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// An account.
    Account(AccountId),
    /// A statement definition.
    Definition(DefinitionId),
    /// A statement grouping.
    Grouping(GroupingId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account {id}"),
            Self::Definition(id) => write!(f, "definition {id}"),
            Self::Grouping(id) => write!(f, "grouping {id}"),
        }
    }
}

/// Errors reported by a [`HierarchyStore`](super::store::HierarchyStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// The backend refused the transaction because of a concurrent writer.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors that can occur while editing a statement hierarchy.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// Deletion blocked by children or linked accounts.
    #[error("Cannot delete definition: it still has {reason}")]
    HasDependents {
        /// Which dependency blocked the delete.
        reason: DependentKind,
    },

    /// The two records belong to different organization/branch scopes.
    #[error("Cannot link {child} to {parent}: different tenant scope")]
    CrossTenantLink {
        /// The record being attached.
        child: EntityRef,
        /// The parent it was attached to.
        parent: EntityRef,
    },

    /// A definition was placed in a grouping of the other hierarchy, or an
    /// operation named the wrong hierarchy for a definition.
    #[error("Hierarchy mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// Kind required by the operation.
        expected: HierarchyKind,
        /// Kind of the stored record.
        found: HierarchyKind,
    },

    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// The store failed; the transaction was rolled back.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The record kept moving under concurrent edits; retry later.
    #[error("Concurrent modification, please retry")]
    ConcurrentModification,
}

impl HierarchyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::HasDependents {
                reason: DependentKind::SubEntries,
            } => "HAS_SUB_ENTRIES",
            Self::HasDependents {
                reason: DependentKind::LinkedAccounts,
            } => "HAS_LINKED_ACCOUNTS",
            Self::CrossTenantLink { .. } => "CROSS_TENANT_LINK",
            Self::KindMismatch { .. } => "HIERARCHY_KIND_MISMATCH",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::HasDependents { .. } | Self::ConcurrentModification => 409,
            Self::CrossTenantLink { .. } => 403,
            Self::KindMismatch { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification | Self::Storage(_))
    }
}

impl From<StoreError> for HierarchyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => Self::NotFound(entity),
            StoreError::Conflict(_) => Self::ConcurrentModification,
            StoreError::Backend(message) => Self::Storage(message),
        }
    }
}
