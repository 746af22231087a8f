//! In-memory hierarchy store.
//!
//! Each transaction works on a snapshot taken at `begin` and publishes the
//! records it wrote on `commit`. There are no row locks: like any
//! snapshot store, two transactions editing the same parent concurrently
//! lose updates unless the caller serializes them with [`ParentLocks`].
//!
//! [`ParentLocks`]: super::locks::ParentLocks

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use coopledger_shared::types::{AccountId, DefinitionId, GroupingId};

use super::error::{EntityRef, StoreError};
use super::store::{HierarchyStore, HierarchyTransaction};
use super::types::{Account, HierarchyKind, ParentKey, StatementDefinition, StatementGrouping};

#[derive(Debug, Clone, Default)]
struct Records {
    accounts: HashMap<AccountId, Account>,
    definitions: HashMap<DefinitionId, StatementDefinition>,
    groupings: HashMap<GroupingId, StatementGrouping>,
}

#[derive(Debug, Default)]
struct Shared {
    records: Mutex<Records>,
    fail_after_writes: Mutex<Option<usize>>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl Shared {
    fn records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot-isolated store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHierarchyStore {
    shared: Arc<Shared>,
}

impl InMemoryHierarchyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account outside any transaction.
    pub fn insert_account(&self, account: Account) {
        self.shared.records().accounts.insert(account.id, account);
    }

    /// Inserts or replaces a definition outside any transaction.
    ///
    /// Loaded `child_entries` and `linked_accounts` are not stored.
    pub fn insert_definition(&self, mut definition: StatementDefinition) {
        definition.child_entries.clear();
        definition.linked_accounts.clear();
        self.shared.records().definitions.insert(definition.id, definition);
    }

    /// Inserts or replaces a grouping outside any transaction.
    pub fn insert_grouping(&self, grouping: StatementGrouping) {
        self.shared.records().groupings.insert(grouping.id, grouping);
    }

    /// Committed state of an account.
    #[must_use]
    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.shared.records().accounts.get(&id).cloned()
    }

    /// Committed state of a definition.
    #[must_use]
    pub fn definition(&self, id: DefinitionId) -> Option<StatementDefinition> {
        self.shared.records().definitions.get(&id).cloned()
    }

    /// Committed accounts linked to a definition, in index order.
    #[must_use]
    pub fn linked_accounts(&self, kind: HierarchyKind, definition: DefinitionId) -> Vec<Account> {
        sorted_linked(&self.shared.records(), kind, definition)
    }

    /// Committed definitions of a grouping, in index order.
    #[must_use]
    pub fn grouping_definitions(&self, grouping: GroupingId) -> Vec<StatementDefinition> {
        sorted_in_grouping(&self.shared.records(), grouping)
    }

    /// Makes every transaction fail on its write number `writes + 1`.
    ///
    /// `None` disables the fault.
    pub fn fail_after_writes(&self, writes: Option<usize>) {
        *self
            .shared
            .fail_after_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = writes;
    }

    /// Number of committed transactions.
    #[must_use]
    pub fn commits(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    /// Number of rolled back transactions.
    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }
}

impl HierarchyStore for InMemoryHierarchyStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, StoreError> {
        // Give other tasks a chance to interleave, as real I/O would.
        tokio::task::yield_now().await;
        let snapshot = self.shared.records().clone();
        let fail_after = *self
            .shared
            .fail_after_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(InMemoryTransaction {
            shared: Arc::clone(&self.shared),
            staged: snapshot,
            written_accounts: HashSet::new(),
            written_definitions: HashSet::new(),
            deleted_definitions: HashSet::new(),
            writes: 0,
            fail_after,
        })
    }
}

/// Transaction over an [`InMemoryHierarchyStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    shared: Arc<Shared>,
    staged: Records,
    written_accounts: HashSet<(AccountId, HierarchyKind)>,
    written_definitions: HashSet<DefinitionId>,
    deleted_definitions: HashSet<DefinitionId>,
    writes: usize,
    fail_after: Option<usize>,
}

impl InMemoryTransaction {
    fn count_write(&mut self) -> Result<(), StoreError> {
        if self.fail_after.is_some_and(|limit| self.writes >= limit) {
            return Err(StoreError::Backend(format!(
                "injected failure on write {}",
                self.writes + 1
            )));
        }
        self.writes += 1;
        Ok(())
    }
}

impl HierarchyTransaction for InMemoryTransaction {
    async fn lock_parent(&mut self, parent: ParentKey) -> Result<(), StoreError> {
        match parent {
            ParentKey::Definition(id) if !self.staged.definitions.contains_key(&id) => {
                Err(StoreError::NotFound(EntityRef::Definition(id)))
            }
            ParentKey::Grouping(id) if !self.staged.groupings.contains_key(&id) => {
                Err(StoreError::NotFound(EntityRef::Grouping(id)))
            }
            _ => Ok(()),
        }
    }

    async fn account(&mut self, id: AccountId) -> Result<Account, StoreError> {
        self.staged
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(EntityRef::Account(id)))
    }

    async fn definition(&mut self, id: DefinitionId) -> Result<StatementDefinition, StoreError> {
        self.staged
            .definitions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(EntityRef::Definition(id)))
    }

    async fn grouping(&mut self, id: GroupingId) -> Result<StatementGrouping, StoreError> {
        self.staged
            .groupings
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(EntityRef::Grouping(id)))
    }

    async fn linked_accounts(
        &mut self,
        kind: HierarchyKind,
        definition: DefinitionId,
    ) -> Result<Vec<Account>, StoreError> {
        Ok(sorted_linked(&self.staged, kind, definition))
    }

    async fn child_definitions(&mut self, parent: DefinitionId) -> Result<Vec<StatementDefinition>, StoreError> {
        let mut children: Vec<_> = self
            .staged
            .definitions
            .values()
            .filter(|definition| definition.parent_definition_id == Some(parent))
            .cloned()
            .collect();
        children.sort_by_key(|definition| definition.index);
        Ok(children)
    }

    async fn grouping_definitions(&mut self, grouping: GroupingId) -> Result<Vec<StatementDefinition>, StoreError> {
        Ok(sorted_in_grouping(&self.staged, grouping))
    }

    async fn save_account(&mut self, kind: HierarchyKind, account: &Account) -> Result<(), StoreError> {
        if !self.staged.accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound(EntityRef::Account(account.id)));
        }
        self.count_write()?;
        if let Some(staged) = self.staged.accounts.get_mut(&account.id) {
            copy_account_placement(kind, account, staged);
        }
        self.written_accounts.insert((account.id, kind));
        Ok(())
    }

    async fn save_definition(&mut self, definition: &StatementDefinition) -> Result<(), StoreError> {
        if !self.staged.definitions.contains_key(&definition.id) {
            return Err(StoreError::NotFound(EntityRef::Definition(definition.id)));
        }
        self.count_write()?;
        if let Some(staged) = self.staged.definitions.get_mut(&definition.id) {
            copy_definition_placement(definition, staged);
        }
        self.written_definitions.insert(definition.id);
        Ok(())
    }

    async fn delete_definition(&mut self, id: DefinitionId) -> Result<(), StoreError> {
        if !self.staged.definitions.contains_key(&id) {
            return Err(StoreError::NotFound(EntityRef::Definition(id)));
        }
        self.count_write()?;
        self.staged.definitions.remove(&id);
        self.written_definitions.remove(&id);
        self.deleted_definitions.insert(id);
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        let mut records = self.shared.records();
        for (id, kind) in &self.written_accounts {
            if let (Some(staged), Some(committed)) =
                (self.staged.accounts.get(id), records.accounts.get_mut(id))
            {
                copy_account_placement(*kind, staged, committed);
            }
        }
        for id in &self.written_definitions {
            if let (Some(staged), Some(committed)) =
                (self.staged.definitions.get(id), records.definitions.get_mut(id))
            {
                copy_definition_placement(staged, committed);
            }
        }
        for id in &self.deleted_definitions {
            records.definitions.remove(id);
        }
        drop(records);
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn copy_account_placement(kind: HierarchyKind, from: &Account, to: &mut Account) {
    let access = Account::access(kind);
    (access.set_parent)(to, (access.parent)(from));
    (access.set_index)(to, (access.index)(from));
}

fn copy_definition_placement(from: &StatementDefinition, to: &mut StatementDefinition) {
    to.grouping_id = from.grouping_id;
    to.index = from.index;
}

fn sorted_linked(records: &Records, kind: HierarchyKind, definition: DefinitionId) -> Vec<Account> {
    let mut accounts: Vec<_> = records
        .accounts
        .values()
        .filter(|account| account.definition_id(kind) == Some(definition))
        .cloned()
        .collect();
    accounts.sort_by(|a, b| a.index(kind).total_cmp(&b.index(kind)).then(a.id.cmp(&b.id)));
    accounts
}

fn sorted_in_grouping(records: &Records, grouping: GroupingId) -> Vec<StatementDefinition> {
    let mut definitions: Vec<_> = records
        .definitions
        .values()
        .filter(|definition| definition.grouping_id == Some(grouping))
        .cloned()
        .collect();
    definitions.sort_by_key(|definition| (definition.index, definition.id));
    definitions
}
