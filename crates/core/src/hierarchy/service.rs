//! Transactional hierarchy edits.
//!
//! Every operation:
//! 1. reads the record's current parent,
//! 2. takes the in-process lock of every parent it will touch,
//! 3. opens one store transaction and row-locks the same parents,
//! 4. re-reads, applies [`StatementTree`] rules and writes changed records,
//! 5. commits, or rolls back on any error.
//!
//! If the record moved to another parent between steps 1 and 4 the attempt
//! is rolled back and retried with the new parent.

use std::sync::Arc;

use coopledger_shared::types::{AccountId, DefinitionId, GroupingId};

use super::error::{HierarchyError, StoreError};
use super::locks::ParentLocks;
use super::ordering::{OrderedSiblingList, Reordered};
use super::store::{HierarchyStore, HierarchyTransaction};
use super::tree::StatementTree;
use super::types::{Account, DEFINITIONS_IN_GROUPING, HierarchyKind, ParentKey, StatementDefinition};

/// Attempts before giving up with [`HierarchyError::ConcurrentModification`].
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy)]
enum Placement {
    At(i64),
    Append,
}

/// Serialized, atomic edits to the statement hierarchies.
#[derive(Debug)]
pub struct HierarchyService<S> {
    store: Arc<S>,
    locks: ParentLocks,
}

impl<S> Clone for HierarchyService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: self.locks.clone(),
        }
    }
}

impl<S: HierarchyStore> HierarchyService<S> {
    /// Creates a service with its own lock table.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_locks(store, ParentLocks::new())
    }

    /// Creates a service sharing an existing lock table.
    #[must_use]
    pub fn with_locks(store: Arc<S>, locks: ParentLocks) -> Self {
        Self { store, locks }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves an account to `target` under a definition.
    ///
    /// An account linked to another definition is attached here and the gap
    /// it leaves behind is closed, all in one transaction.
    pub async fn reorder_account(
        &self,
        kind: HierarchyKind,
        definition_id: DefinitionId,
        account_id: AccountId,
        target: i64,
    ) -> Result<Reordered<Account, AccountId>, HierarchyError> {
        self.place_account(kind, definition_id, account_id, Placement::At(target))
            .await
    }

    /// Links an account to a definition, appending it after the current
    /// siblings.
    pub async fn link_account(
        &self,
        kind: HierarchyKind,
        definition_id: DefinitionId,
        account_id: AccountId,
    ) -> Result<Reordered<Account, AccountId>, HierarchyError> {
        self.place_account(kind, definition_id, account_id, Placement::Append)
            .await
    }

    /// Clears an account's link and renumbers the siblings it leaves.
    ///
    /// Returns the updated account. Unlinked accounts are returned as is.
    pub async fn unlink_account(
        &self,
        kind: HierarchyKind,
        account_id: AccountId,
    ) -> Result<Account, HierarchyError> {
        for _ in 0..MAX_ATTEMPTS {
            let account = self.peek_account(account_id).await?;
            let Some(previous) = account.definition_id(kind) else {
                return Ok(account);
            };

            let guard = self.locks.acquire(ParentKey::Definition(previous)).await;
            let mut tx = self.store.begin().await?;
            let result = unlink_account_in(&mut tx, guard.keys(), kind, previous, account_id).await;
            if let Some(account) = finish(tx, result).await? {
                return Ok(account);
            }
        }
        Err(HierarchyError::ConcurrentModification)
    }

    /// Moves a definition to `target` within a grouping, attaching it if it
    /// currently sits in another grouping.
    pub async fn move_definition(
        &self,
        grouping_id: GroupingId,
        definition_id: DefinitionId,
        target: i64,
    ) -> Result<Reordered<StatementDefinition, DefinitionId>, HierarchyError> {
        for _ in 0..MAX_ATTEMPTS {
            let previous = self.peek_definition(definition_id).await?.grouping_id;
            let parents = std::iter::once(grouping_id)
                .chain(previous)
                .map(ParentKey::Grouping);

            let guard = self.locks.acquire_many(parents).await;
            let mut tx = self.store.begin().await?;
            let result = move_definition_in(
                &mut tx,
                guard.keys(),
                grouping_id,
                definition_id,
                previous,
                target,
            )
            .await;
            if let Some(moved) = finish(tx, result).await? {
                return Ok(moved);
            }
        }
        Err(HierarchyError::ConcurrentModification)
    }

    /// Returns true when the definition has no child entries and no account
    /// links to it.
    pub async fn can_delete_definition(&self, definition_id: DefinitionId) -> Result<bool, HierarchyError> {
        let mut tx = self.store.begin().await?;
        let result = load_for_delete(&mut tx, definition_id).await;
        tx.rollback().await?;
        let (definition, accounts) = result?;
        Ok(StatementTree::can_delete(&definition, &accounts))
    }

    /// Deletes a definition and renumbers the rest of its grouping.
    ///
    /// Fails with [`HierarchyError::HasDependents`] while child entries or
    /// linked accounts remain.
    pub async fn delete_definition(&self, definition_id: DefinitionId) -> Result<(), HierarchyError> {
        for _ in 0..MAX_ATTEMPTS {
            let grouping = self.peek_definition(definition_id).await?.grouping_id;
            let parents = std::iter::once(ParentKey::Definition(definition_id))
                .chain(grouping.map(ParentKey::Grouping));

            let guard = self.locks.acquire_many(parents).await;
            let mut tx = self.store.begin().await?;
            let result = delete_definition_in(&mut tx, guard.keys(), definition_id, grouping).await;
            if finish(tx, result).await?.is_some() {
                return Ok(());
            }
        }
        Err(HierarchyError::ConcurrentModification)
    }

    async fn place_account(
        &self,
        kind: HierarchyKind,
        definition_id: DefinitionId,
        account_id: AccountId,
        placement: Placement,
    ) -> Result<Reordered<Account, AccountId>, HierarchyError> {
        for _ in 0..MAX_ATTEMPTS {
            let previous = self.peek_account(account_id).await?.definition_id(kind);
            let parents = std::iter::once(definition_id)
                .chain(previous)
                .map(ParentKey::Definition);

            let guard = self.locks.acquire_many(parents).await;
            let mut tx = self.store.begin().await?;
            let result = place_account_in(
                &mut tx,
                guard.keys(),
                kind,
                definition_id,
                account_id,
                previous,
                placement,
            )
            .await;
            if let Some(placed) = finish(tx, result).await? {
                return Ok(placed);
            }
        }
        Err(HierarchyError::ConcurrentModification)
    }

    async fn peek_account(&self, account_id: AccountId) -> Result<Account, HierarchyError> {
        let mut tx = self.store.begin().await?;
        let account = tx.account(account_id).await;
        tx.rollback().await?;
        Ok(account?)
    }

    async fn peek_definition(&self, definition_id: DefinitionId) -> Result<StatementDefinition, HierarchyError> {
        let mut tx = self.store.begin().await?;
        let definition = tx.definition(definition_id).await;
        tx.rollback().await?;
        Ok(definition?)
    }
}

/// Commits on success, rolls back otherwise.
///
/// `Ok(None)` means the attempt saw a stale parent and should be retried.
async fn finish<T, R>(tx: T, result: Result<Option<R>, HierarchyError>) -> Result<Option<R>, HierarchyError>
where
    T: HierarchyTransaction,
{
    match result {
        Ok(Some(value)) => {
            tx.commit().await?;
            Ok(Some(value))
        }
        Ok(None) => {
            tx.rollback().await?;
            Ok(None)
        }
        Err(err) => {
            // The operation error is reported even if the rollback fails too.
            let _rollback: Result<(), StoreError> = tx.rollback().await;
            Err(err)
        }
    }
}

async fn lock_all<T: HierarchyTransaction>(tx: &mut T, parents: &[ParentKey]) -> Result<(), HierarchyError> {
    for parent in parents {
        tx.lock_parent(*parent).await?;
    }
    Ok(())
}

async fn place_account_in<T: HierarchyTransaction>(
    tx: &mut T,
    parents: &[ParentKey],
    kind: HierarchyKind,
    definition_id: DefinitionId,
    account_id: AccountId,
    previous: Option<DefinitionId>,
    placement: Placement,
) -> Result<Option<Reordered<Account, AccountId>>, HierarchyError> {
    lock_all(tx, parents).await?;

    let mut definition = tx.definition(definition_id).await?;
    if definition.kind != kind {
        return Err(HierarchyError::KindMismatch {
            expected: kind,
            found: definition.kind,
        });
    }
    let account = tx.account(account_id).await?;
    if account.definition_id(kind) != previous {
        return Ok(None);
    }

    definition.linked_accounts = tx.linked_accounts(kind, definition_id).await?;
    let changed = match placement {
        Placement::At(target) => StatementTree::reorder_account(&mut definition, account, target)?,
        Placement::Append => StatementTree::link_account(&mut definition, account)?,
    };

    let mut writes: Vec<Account> = definition
        .linked_accounts
        .iter()
        .filter(|sibling| changed.contains(&sibling.id))
        .cloned()
        .collect();

    if let Some(previous) = previous.filter(|previous| *previous != definition_id) {
        let left_behind = tx.linked_accounts(kind, previous).await?;
        let mut list = OrderedSiblingList::new(previous, left_behind, Account::access(kind));
        if let Some((_, closed)) = list.remove(account_id) {
            writes.extend(
                list.items()
                    .iter()
                    .filter(|sibling| closed.contains(&sibling.id))
                    .cloned(),
            );
        }
    }

    for account in &writes {
        tx.save_account(kind, account).await?;
    }

    Ok(Some(Reordered {
        siblings: definition.linked_accounts,
        changed,
    }))
}

async fn unlink_account_in<T: HierarchyTransaction>(
    tx: &mut T,
    parents: &[ParentKey],
    kind: HierarchyKind,
    previous: DefinitionId,
    account_id: AccountId,
) -> Result<Option<Account>, HierarchyError> {
    lock_all(tx, parents).await?;

    let mut definition = tx.definition(previous).await?;
    if definition.kind != kind {
        return Err(HierarchyError::KindMismatch {
            expected: kind,
            found: definition.kind,
        });
    }
    let mut account = tx.account(account_id).await?;
    if account.definition_id(kind) != Some(previous) {
        return Ok(None);
    }

    definition.linked_accounts = tx.linked_accounts(kind, previous).await?;
    let changed = StatementTree::unlink_account(&mut definition, &mut account);

    tx.save_account(kind, &account).await?;
    for sibling in definition
        .linked_accounts
        .iter()
        .filter(|sibling| changed.contains(&sibling.id))
    {
        tx.save_account(kind, sibling).await?;
    }

    Ok(Some(account))
}

async fn move_definition_in<T: HierarchyTransaction>(
    tx: &mut T,
    parents: &[ParentKey],
    grouping_id: GroupingId,
    definition_id: DefinitionId,
    previous: Option<GroupingId>,
    target: i64,
) -> Result<Option<Reordered<StatementDefinition, DefinitionId>>, HierarchyError> {
    lock_all(tx, parents).await?;

    let grouping = tx.grouping(grouping_id).await?;
    let definition = tx.definition(definition_id).await?;
    if definition.grouping_id != previous {
        return Ok(None);
    }

    let siblings = tx.grouping_definitions(grouping_id).await?;
    let moved = StatementTree::move_definition(&grouping, siblings, definition, target)?;

    let mut writes: Vec<StatementDefinition> = moved
        .siblings
        .iter()
        .filter(|sibling| moved.changed.contains(&sibling.id))
        .cloned()
        .collect();

    if let Some(previous) = previous.filter(|previous| *previous != grouping_id) {
        let left_behind = tx.grouping_definitions(previous).await?;
        let mut list = OrderedSiblingList::new(previous, left_behind, DEFINITIONS_IN_GROUPING);
        if let Some((_, closed)) = list.remove(definition_id) {
            writes.extend(
                list.items()
                    .iter()
                    .filter(|sibling| closed.contains(&sibling.id))
                    .cloned(),
            );
        }
    }

    for definition in &writes {
        tx.save_definition(definition).await?;
    }

    Ok(Some(moved))
}

async fn load_for_delete<T: HierarchyTransaction>(
    tx: &mut T,
    definition_id: DefinitionId,
) -> Result<(StatementDefinition, Vec<Account>), HierarchyError> {
    let mut definition = tx.definition(definition_id).await?;
    definition.child_entries = tx.child_definitions(definition_id).await?;
    let mut accounts = Vec::new();
    for kind in HierarchyKind::ALL {
        accounts.extend(tx.linked_accounts(kind, definition_id).await?);
    }
    Ok((definition, accounts))
}

async fn delete_definition_in<T: HierarchyTransaction>(
    tx: &mut T,
    parents: &[ParentKey],
    definition_id: DefinitionId,
    grouping: Option<GroupingId>,
) -> Result<Option<()>, HierarchyError> {
    lock_all(tx, parents).await?;

    let (definition, accounts) = load_for_delete(tx, definition_id).await?;
    if definition.grouping_id != grouping {
        return Ok(None);
    }
    StatementTree::check_delete(&definition, &accounts)?;

    tx.delete_definition(definition_id).await?;

    if let Some(grouping) = grouping {
        let remaining = tx.grouping_definitions(grouping).await?;
        let mut list = OrderedSiblingList::new(grouping, remaining, DEFINITIONS_IN_GROUPING);
        let changed = list.renumber();
        for sibling in list.items().iter().filter(|sibling| changed.contains(&sibling.id)) {
            tx.save_definition(sibling).await?;
        }
    }

    Ok(Some(()))
}
