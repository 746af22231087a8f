//! General ledger reads.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Select};
use tracing::error;

use coopledger_core::ledger::{AccountClassification, LedgerEntry, LedgerError, LedgerFilter, LedgerQuery};
use coopledger_shared::types::AccountId;
use coopledger_shared::{TenantScope, UnknownTypePolicy};

use crate::entities::sea_orm_active_enums::LedgerSource as DbLedgerSource;
use crate::entities::{accounts, general_ledger_entries};

/// Ledger query over the `general_ledger_entries` table.
///
/// Each row is classified by its account's type label, resolved with the
/// configured unknown type policy.
#[derive(Debug, Clone)]
pub struct SeaLedgerQuery {
    db: DatabaseConnection,
    policy: UnknownTypePolicy,
}

impl SeaLedgerQuery {
    /// Creates a ledger query with the given unknown type policy.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: UnknownTypePolicy) -> Self {
        Self { db, policy }
    }
}

impl LedgerQuery for SeaLedgerQuery {
    async fn find_entries(
        &self,
        scope: TenantScope,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let rows = filtered(scope, filter)
            .find_also_related(accounts::Entity)
            .order_by_asc(general_ledger_entries::Column::EntryDate)
            .order_by_asc(general_ledger_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        rows.into_iter()
            .map(|(row, account)| {
                let account = account.ok_or_else(|| {
                    LedgerError::Query(format!("ledger entry {} has no account", row.id))
                })?;
                let classification =
                    AccountClassification::resolve(&account.account_type, self.policy)?;
                Ok(LedgerEntry {
                    id: row.id.into(),
                    account_id: AccountId::from_uuid(row.account_id),
                    classification,
                    debit: row.debit,
                    credit: row.credit,
                    entry_date: row.entry_date,
                })
            })
            .collect()
    }
}

fn filtered(scope: TenantScope, filter: &LedgerFilter) -> Select<general_ledger_entries::Entity> {
    use general_ledger_entries::Column;

    let mut query = general_ledger_entries::Entity::find()
        .filter(Column::OrganizationId.eq(scope.organization_id.into_inner()))
        .filter(Column::BranchId.eq(scope.branch_id.into_inner()));

    if let Some(id) = filter.account_id {
        query = query.filter(Column::AccountId.eq(id.into_inner()));
    }
    if let Some(id) = filter.member_profile_id {
        query = query.filter(Column::MemberProfileId.eq(id.into_inner()));
    }
    if let Some(id) = filter.employee_user_id {
        query = query.filter(Column::EmployeeUserId.eq(id.into_inner()));
    }
    if let Some(id) = filter.transaction_id {
        query = query.filter(Column::TransactionId.eq(id.into_inner()));
    }
    if let Some(id) = filter.transaction_batch_id {
        query = query.filter(Column::TransactionBatchId.eq(id.into_inner()));
    }
    if let Some(id) = filter.payment_type_id {
        query = query.filter(Column::PaymentTypeId.eq(id.into_inner()));
    }
    if let Some(source) = filter.source {
        query = query.filter(Column::Source.eq(DbLedgerSource::from(source)));
    }
    if let Some(id) = filter.exclude_account_id {
        query = query.filter(Column::AccountId.ne(id.into_inner()));
    }

    query
}

fn query_error(err: DbErr) -> LedgerError {
    error!(error = %err, "Failed to load ledger entries");
    LedgerError::Query(err.to_string())
}
