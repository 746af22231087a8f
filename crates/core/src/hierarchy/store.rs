//! Persistence contract for the statement hierarchy.
//!
//! The service drives one [`HierarchyTransaction`] per operation: lock the
//! parents it touches, read, write the changed records, then commit. Any
//! error rolls the transaction back, so a failed reorder leaves the prior
//! ordering intact.

use std::future::Future;

use coopledger_shared::types::{AccountId, DefinitionId, GroupingId};

use super::error::StoreError;
use super::types::{Account, HierarchyKind, ParentKey, StatementDefinition, StatementGrouping};

/// Opens hierarchy transactions.
pub trait HierarchyStore: Send + Sync {
    /// Transaction handle.
    type Transaction: HierarchyTransaction;

    /// Begins a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, StoreError>> + Send;
}

/// One atomic unit of hierarchy reads and writes.
///
/// Fetched definitions have empty `child_entries` and `linked_accounts`;
/// use the list methods to load them.
pub trait HierarchyTransaction: Send {
    /// Takes a row lock on a parent for the rest of the transaction.
    fn lock_parent(&mut self, parent: ParentKey) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetches an account.
    fn account(&mut self, id: AccountId) -> impl Future<Output = Result<Account, StoreError>> + Send;

    /// Fetches a definition.
    fn definition(
        &mut self,
        id: DefinitionId,
    ) -> impl Future<Output = Result<StatementDefinition, StoreError>> + Send;

    /// Fetches a grouping.
    fn grouping(
        &mut self,
        id: GroupingId,
    ) -> impl Future<Output = Result<StatementGrouping, StoreError>> + Send;

    /// Every account whose stored link for `kind` is `definition`.
    fn linked_accounts(
        &mut self,
        kind: HierarchyKind,
        definition: DefinitionId,
    ) -> impl Future<Output = Result<Vec<Account>, StoreError>> + Send;

    /// Child entries of a definition.
    fn child_definitions(
        &mut self,
        parent: DefinitionId,
    ) -> impl Future<Output = Result<Vec<StatementDefinition>, StoreError>> + Send;

    /// Definitions placed in a grouping.
    fn grouping_definitions(
        &mut self,
        grouping: GroupingId,
    ) -> impl Future<Output = Result<Vec<StatementDefinition>, StoreError>> + Send;

    /// Writes an account's link and position in one hierarchy.
    ///
    /// Placement in the other hierarchy is left untouched, so edits to the
    /// two trees never overwrite each other.
    fn save_account(
        &mut self,
        kind: HierarchyKind,
        account: &Account,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Writes a definition's grouping and position.
    fn save_definition(
        &mut self,
        definition: &StatementDefinition,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a definition.
    fn delete_definition(&mut self, id: DefinitionId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Makes every write visible.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Discards every write.
    fn rollback(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
