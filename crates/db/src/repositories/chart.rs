//! Chart of accounts and ledger record creation.
//!
//! Placement changes go through the hierarchy service; this repository only
//! creates records.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};

use coopledger_core::hierarchy::{Account, HierarchyKind, StatementDefinition, StatementGrouping};
use coopledger_core::ledger::{GeneralLedgerType, LedgerSource};
use coopledger_shared::TenantScope;
use coopledger_shared::types::{
    AccountId, DefinitionId, GroupingId, LedgerEntryId, MemberProfileId, PaymentTypeId,
    TransactionBatchId, TransactionId, UserId,
};

use crate::entities::{accounts, general_ledger_entries, statement_definitions, statement_groupings};
use crate::mapping::{account_from_model, definition_from_model, grouping_from_model};

/// Error types for chart operations.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// Debit or credit below zero.
    #[error("Ledger amounts must be non-negative")]
    NegativeAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning organization and branch.
    pub tenant: TenantScope,
    /// Account name.
    pub name: String,
    /// Stored account type label, e.g. `"Deposit"` or `"A/P-Ledger"`.
    pub account_type: String,
    /// Accounting element.
    pub general_ledger_type: Option<GeneralLedgerType>,
}

/// Input for creating a definition.
#[derive(Debug, Clone)]
pub struct CreateDefinitionInput {
    /// Owning organization and branch.
    pub tenant: TenantScope,
    /// Which tree the definition is part of.
    pub kind: HierarchyKind,
    /// Grouping to place it in.
    pub grouping_id: Option<GroupingId>,
    /// Parent definition for child entries.
    pub parent_definition_id: Option<DefinitionId>,
    /// Position within the grouping.
    pub index: i32,
    /// Display name.
    pub name: String,
    /// Whether entries may be posted directly.
    pub is_posting: bool,
}

/// Input for posting a general ledger row.
#[derive(Debug, Clone)]
pub struct PostEntryInput {
    /// Account posted to.
    pub account_id: AccountId,
    /// Where the row came from.
    pub source: LedgerSource,
    /// Member the row belongs to.
    pub member_profile_id: Option<MemberProfileId>,
    /// Employee who posted it.
    pub employee_user_id: Option<UserId>,
    /// Originating transaction.
    pub transaction_id: Option<TransactionId>,
    /// Teller batch.
    pub transaction_batch_id: Option<TransactionBatchId>,
    /// Payment type used.
    pub payment_type_id: Option<PaymentTypeId>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Business date.
    pub entry_date: NaiveDate,
}

impl PostEntryInput {
    /// A row with no optional references set.
    #[must_use]
    pub const fn new(
        account_id: AccountId,
        source: LedgerSource,
        debit: Decimal,
        credit: Decimal,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            source,
            member_profile_id: None,
            employee_user_id: None,
            transaction_id: None,
            transaction_batch_id: None,
            payment_type_id: None,
            debit,
            credit,
            entry_date,
        }
    }
}

/// Repository creating groupings, definitions, accounts and ledger rows.
#[derive(Debug, Clone)]
pub struct ChartRepository {
    db: DatabaseConnection,
}

impl ChartRepository {
    /// Creates a new chart repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a grouping.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_grouping(
        &self,
        tenant: TenantScope,
        kind: HierarchyKind,
        name: &str,
    ) -> Result<StatementGrouping, ChartError> {
        let now = Utc::now().into();
        let grouping = statement_groupings::ActiveModel {
            id: Set(GroupingId::new().into_inner()),
            organization_id: Set(tenant.organization_id.into_inner()),
            branch_id: Set(tenant.branch_id.into_inner()),
            kind: Set(kind.into()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let grouping = grouping.insert(&self.db).await?;
        Ok(grouping_from_model(grouping))
    }

    /// Creates a definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_definition(
        &self,
        input: CreateDefinitionInput,
    ) -> Result<StatementDefinition, ChartError> {
        let now = Utc::now().into();
        let definition = statement_definitions::ActiveModel {
            id: Set(DefinitionId::new().into_inner()),
            organization_id: Set(input.tenant.organization_id.into_inner()),
            branch_id: Set(input.tenant.branch_id.into_inner()),
            kind: Set(input.kind.into()),
            grouping_id: Set(input.grouping_id.map(GroupingId::into_inner)),
            parent_definition_id: Set(input.parent_definition_id.map(DefinitionId::into_inner)),
            index: Set(input.index),
            is_posting: Set(input.is_posting),
            name: Set(input.name),
            name_in_total: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let definition = definition.insert(&self.db).await?;
        Ok(definition_from_model(definition))
    }

    /// Creates an unlinked account.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_account(&self, input: CreateAccountInput) -> Result<Account, ChartError> {
        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            organization_id: Set(input.tenant.organization_id.into_inner()),
            branch_id: Set(input.tenant.branch_id.into_inner()),
            name: Set(input.name),
            account_type: Set(input.account_type),
            general_ledger_type: Set(input.general_ledger_type.map(Into::into)),
            financial_statement_definition_id: Set(None),
            financial_statement_index: Set(0.0),
            general_ledger_definition_id: Set(None),
            general_ledger_index: Set(0.0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account_from_model(account))
    }

    /// Posts ledger rows in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any amount is negative or an insert fails; no
    /// row is written in that case.
    pub async fn post_entries(
        &self,
        tenant: TenantScope,
        entries: Vec<PostEntryInput>,
    ) -> Result<Vec<LedgerEntryId>, ChartError> {
        if entries
            .iter()
            .any(|entry| entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO)
        {
            return Err(ChartError::NegativeAmount);
        }

        let now = Utc::now().into();
        let ids: Vec<LedgerEntryId> = entries.iter().map(|_| LedgerEntryId::new()).collect();
        let models: Vec<general_ledger_entries::ActiveModel> = entries
            .into_iter()
            .zip(&ids)
            .map(|(entry, id)| general_ledger_entries::ActiveModel {
                id: Set(id.into_inner()),
                organization_id: Set(tenant.organization_id.into_inner()),
                branch_id: Set(tenant.branch_id.into_inner()),
                account_id: Set(entry.account_id.into_inner()),
                member_profile_id: Set(entry.member_profile_id.map(MemberProfileId::into_inner)),
                employee_user_id: Set(entry.employee_user_id.map(UserId::into_inner)),
                transaction_id: Set(entry.transaction_id.map(TransactionId::into_inner)),
                transaction_batch_id: Set(entry.transaction_batch_id.map(TransactionBatchId::into_inner)),
                payment_type_id: Set(entry.payment_type_id.map(PaymentTypeId::into_inner)),
                source: Set(entry.source.into()),
                debit: Set(entry.debit),
                credit: Set(entry.credit),
                entry_date: Set(entry.entry_date),
                created_at: Set(now),
            })
            .collect();

        if models.is_empty() {
            return Ok(ids);
        }

        let txn = self.db.begin().await?;
        general_ledger_entries::Entity::insert_many(models)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(ids)
    }
}
