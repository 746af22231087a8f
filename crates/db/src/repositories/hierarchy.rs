//! PostgreSQL-backed hierarchy store.
//!
//! Parents are row-locked with `SELECT ... FOR UPDATE`, so two services in
//! different processes still serialize their edits to one sibling list.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RuntimeErr, Set, TransactionTrait, Unchanged,
};
use tracing::{debug, error, warn};

use coopledger_core::hierarchy::{
    Account, EntityRef, HierarchyKind, HierarchyStore, HierarchyTransaction, ParentKey,
    StatementDefinition, StatementGrouping, StoreError,
};
use coopledger_shared::TenantScope;
use coopledger_shared::types::{AccountId, DefinitionId, GroupingId};

use crate::entities::sea_orm_active_enums::HierarchyKind as DbHierarchyKind;
use crate::entities::{accounts, statement_definitions, statement_groupings};
use crate::mapping::{account_from_model, definition_from_model, grouping_from_model};

/// SQLSTATE codes that mean "another writer got there first".
const CONFLICT_SQLSTATES: [&str; 3] = ["40001", "40P01", "55P03"];

/// Hierarchy store over a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct SeaHierarchyStore {
    db: DatabaseConnection,
}

impl SeaHierarchyStore {
    /// Creates a new hierarchy store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl HierarchyStore for SeaHierarchyStore {
    type Transaction = SeaHierarchyTransaction;

    async fn begin(&self) -> Result<Self::Transaction, StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;
        Ok(SeaHierarchyTransaction { txn })
    }
}

/// One database transaction of hierarchy edits.
pub struct SeaHierarchyTransaction {
    txn: DatabaseTransaction,
}

impl std::fmt::Debug for SeaHierarchyTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeaHierarchyTransaction").finish_non_exhaustive()
    }
}

impl HierarchyTransaction for SeaHierarchyTransaction {
    async fn lock_parent(&mut self, parent: ParentKey) -> Result<(), StoreError> {
        let found = match parent {
            ParentKey::Definition(id) => statement_definitions::Entity::find_by_id(id.into_inner())
                .lock_exclusive()
                .one(&self.txn)
                .await
                .map_err(store_error)?
                .is_some(),
            ParentKey::Grouping(id) => statement_groupings::Entity::find_by_id(id.into_inner())
                .lock_exclusive()
                .one(&self.txn)
                .await
                .map_err(store_error)?
                .is_some(),
        };

        if !found {
            return Err(StoreError::NotFound(missing(parent)));
        }
        debug!(%parent, "Locked parent row");
        Ok(())
    }

    async fn account(&mut self, id: AccountId) -> Result<Account, StoreError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(store_error)?
            .map(account_from_model)
            .ok_or(StoreError::NotFound(EntityRef::Account(id)))
    }

    async fn definition(&mut self, id: DefinitionId) -> Result<StatementDefinition, StoreError> {
        statement_definitions::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(store_error)?
            .map(definition_from_model)
            .ok_or(StoreError::NotFound(EntityRef::Definition(id)))
    }

    async fn grouping(&mut self, id: GroupingId) -> Result<StatementGrouping, StoreError> {
        statement_groupings::Entity::find_by_id(id.into_inner())
            .one(&self.txn)
            .await
            .map_err(store_error)?
            .map(grouping_from_model)
            .ok_or(StoreError::NotFound(EntityRef::Grouping(id)))
    }

    async fn linked_accounts(
        &mut self,
        kind: HierarchyKind,
        definition: DefinitionId,
    ) -> Result<Vec<Account>, StoreError> {
        let (link, index) = placement_columns(kind);
        let rows = accounts::Entity::find()
            .filter(link.eq(definition.into_inner()))
            .order_by_asc(index)
            .order_by_asc(accounts::Column::Id)
            .all(&self.txn)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(account_from_model).collect())
    }

    async fn child_definitions(
        &mut self,
        parent: DefinitionId,
    ) -> Result<Vec<StatementDefinition>, StoreError> {
        let rows = statement_definitions::Entity::find()
            .filter(statement_definitions::Column::ParentDefinitionId.eq(parent.into_inner()))
            .order_by_asc(statement_definitions::Column::Index)
            .order_by_asc(statement_definitions::Column::Id)
            .all(&self.txn)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(definition_from_model).collect())
    }

    async fn grouping_definitions(
        &mut self,
        grouping: GroupingId,
    ) -> Result<Vec<StatementDefinition>, StoreError> {
        let rows = statement_definitions::Entity::find()
            .filter(statement_definitions::Column::GroupingId.eq(grouping.into_inner()))
            .order_by_asc(statement_definitions::Column::Index)
            .order_by_asc(statement_definitions::Column::Id)
            .all(&self.txn)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(definition_from_model).collect())
    }

    async fn save_account(&mut self, kind: HierarchyKind, account: &Account) -> Result<(), StoreError> {
        let mut model = accounts::ActiveModel {
            id: Unchanged(account.id.into_inner()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let link = account.definition_id(kind).map(DefinitionId::into_inner);
        let index = account.index(kind);
        match kind {
            HierarchyKind::FinancialStatement => {
                model.financial_statement_definition_id = Set(link);
                model.financial_statement_index = Set(index);
            }
            HierarchyKind::GeneralLedger => {
                model.general_ledger_definition_id = Set(link);
                model.general_ledger_index = Set(index);
            }
        }

        model.update(&self.txn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => StoreError::NotFound(EntityRef::Account(account.id)),
            other => store_error(other),
        })?;
        debug!(account_id = %account.id, %kind, index, "Saved account placement");
        Ok(())
    }

    async fn save_definition(&mut self, definition: &StatementDefinition) -> Result<(), StoreError> {
        let model = statement_definitions::ActiveModel {
            id: Unchanged(definition.id.into_inner()),
            grouping_id: Set(definition.grouping_id.map(GroupingId::into_inner)),
            index: Set(definition.index),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        model.update(&self.txn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => StoreError::NotFound(EntityRef::Definition(definition.id)),
            other => store_error(other),
        })?;
        debug!(definition_id = %definition.id, index = definition.index, "Saved definition placement");
        Ok(())
    }

    async fn delete_definition(&mut self, id: DefinitionId) -> Result<(), StoreError> {
        let result = statement_definitions::Entity::delete_by_id(id.into_inner())
            .exec(&self.txn)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(EntityRef::Definition(id)));
        }
        debug!(definition_id = %id, "Deleted definition");
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(store_error)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(|e| {
            error!(error = %e, "Failed to roll back hierarchy transaction");
            store_error(e)
        })?;
        debug!("Rolled back hierarchy transaction");
        Ok(())
    }
}

impl SeaHierarchyStore {
    /// Lists the groupings of one hierarchy for a tenant, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn groupings(
        &self,
        tenant: TenantScope,
        kind: HierarchyKind,
    ) -> Result<Vec<StatementGrouping>, StoreError> {
        let rows = statement_groupings::Entity::find()
            .filter(statement_groupings::Column::OrganizationId.eq(tenant.organization_id.into_inner()))
            .filter(statement_groupings::Column::BranchId.eq(tenant.branch_id.into_inner()))
            .filter(statement_groupings::Column::Kind.eq(DbHierarchyKind::from(kind)))
            .order_by_asc(statement_groupings::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(grouping_from_model).collect())
    }
}

const fn placement_columns(kind: HierarchyKind) -> (accounts::Column, accounts::Column) {
    match kind {
        HierarchyKind::FinancialStatement => (
            accounts::Column::FinancialStatementDefinitionId,
            accounts::Column::FinancialStatementIndex,
        ),
        HierarchyKind::GeneralLedger => (
            accounts::Column::GeneralLedgerDefinitionId,
            accounts::Column::GeneralLedgerIndex,
        ),
    }
}

const fn missing(parent: ParentKey) -> EntityRef {
    match parent {
        ParentKey::Definition(id) => EntityRef::Definition(id),
        ParentKey::Grouping(id) => EntityRef::Grouping(id),
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err))) => {
            db_err.code().map(std::borrow::Cow::into_owned)
        }
        _ => None,
    }
}

fn is_conflict(code: &str) -> bool {
    CONFLICT_SQLSTATES.contains(&code)
}

/// Maps a database error onto the store contract.
///
/// Serialization failures, deadlocks and lock timeouts become
/// [`StoreError::Conflict`] so the service can report them as retryable.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    match sqlstate(&err) {
        Some(code) if is_conflict(&code) => {
            warn!(error = %err, sqlstate = %code, "Hierarchy write conflict");
            StoreError::Conflict(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
