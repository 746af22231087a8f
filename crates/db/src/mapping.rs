//! Conversions between stored rows and domain records.

use coopledger_core::hierarchy::{Account, HierarchyKind, StatementDefinition, StatementGrouping};
use coopledger_core::ledger::{AccountClassification, GeneralLedgerType, LedgerSource};
use coopledger_shared::TenantScope;
use coopledger_shared::types::{BranchId, DefinitionId, GroupingId, OrganizationId};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums as db;
use crate::entities::{accounts, statement_definitions, statement_groupings};

pub(crate) fn tenant(organization_id: Uuid, branch_id: Uuid) -> TenantScope {
    TenantScope::new(
        OrganizationId::from_uuid(organization_id),
        BranchId::from_uuid(branch_id),
    )
}

impl From<HierarchyKind> for db::HierarchyKind {
    fn from(kind: HierarchyKind) -> Self {
        match kind {
            HierarchyKind::FinancialStatement => Self::FinancialStatement,
            HierarchyKind::GeneralLedger => Self::GeneralLedger,
        }
    }
}

impl From<db::HierarchyKind> for HierarchyKind {
    fn from(kind: db::HierarchyKind) -> Self {
        match kind {
            db::HierarchyKind::FinancialStatement => Self::FinancialStatement,
            db::HierarchyKind::GeneralLedger => Self::GeneralLedger,
        }
    }
}

impl From<GeneralLedgerType> for db::GeneralLedgerType {
    fn from(gl_type: GeneralLedgerType) -> Self {
        match gl_type {
            GeneralLedgerType::Assets => Self::Assets,
            GeneralLedgerType::Liabilities => Self::Liabilities,
            GeneralLedgerType::Equity => Self::Equity,
            GeneralLedgerType::Revenue => Self::Revenue,
            GeneralLedgerType::Expenses => Self::Expenses,
        }
    }
}

impl From<db::GeneralLedgerType> for GeneralLedgerType {
    fn from(gl_type: db::GeneralLedgerType) -> Self {
        match gl_type {
            db::GeneralLedgerType::Assets => Self::Assets,
            db::GeneralLedgerType::Liabilities => Self::Liabilities,
            db::GeneralLedgerType::Equity => Self::Equity,
            db::GeneralLedgerType::Revenue => Self::Revenue,
            db::GeneralLedgerType::Expenses => Self::Expenses,
        }
    }
}

impl From<LedgerSource> for db::LedgerSource {
    fn from(source: LedgerSource) -> Self {
        match source {
            LedgerSource::Withdraw => Self::Withdraw,
            LedgerSource::Deposit => Self::Deposit,
            LedgerSource::Journal => Self::Journal,
            LedgerSource::Payment => Self::Payment,
            LedgerSource::Adjustment => Self::Adjustment,
            LedgerSource::JournalVoucher => Self::JournalVoucher,
            LedgerSource::CheckVoucher => Self::CheckVoucher,
            LedgerSource::Loan => Self::Loan,
            LedgerSource::SavingsInterest => Self::SavingsInterest,
            LedgerSource::MutualContribution => Self::MutualContribution,
        }
    }
}

impl From<db::LedgerSource> for LedgerSource {
    fn from(source: db::LedgerSource) -> Self {
        match source {
            db::LedgerSource::Withdraw => Self::Withdraw,
            db::LedgerSource::Deposit => Self::Deposit,
            db::LedgerSource::Journal => Self::Journal,
            db::LedgerSource::Payment => Self::Payment,
            db::LedgerSource::Adjustment => Self::Adjustment,
            db::LedgerSource::JournalVoucher => Self::JournalVoucher,
            db::LedgerSource::CheckVoucher => Self::CheckVoucher,
            db::LedgerSource::Loan => Self::Loan,
            db::LedgerSource::SavingsInterest => Self::SavingsInterest,
            db::LedgerSource::MutualContribution => Self::MutualContribution,
        }
    }
}

/// Builds the hierarchy view of an account row.
///
/// The hierarchy never applies sign rules, so an unknown type label is
/// shown as [`AccountClassification::Other`] here regardless of policy.
pub(crate) fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: model.id.into(),
        tenant: tenant(model.organization_id, model.branch_id),
        name: model.name,
        classification: model
            .account_type
            .parse()
            .unwrap_or(AccountClassification::Other),
        general_ledger_type: model.general_ledger_type.map(Into::into),
        financial_statement_definition_id: model
            .financial_statement_definition_id
            .map(DefinitionId::from_uuid),
        financial_statement_index: model.financial_statement_index,
        general_ledger_definition_id: model.general_ledger_definition_id.map(DefinitionId::from_uuid),
        general_ledger_index: model.general_ledger_index,
    }
}

pub(crate) fn definition_from_model(model: statement_definitions::Model) -> StatementDefinition {
    StatementDefinition {
        id: model.id.into(),
        tenant: tenant(model.organization_id, model.branch_id),
        kind: model.kind.into(),
        grouping_id: model.grouping_id.map(GroupingId::from_uuid),
        parent_definition_id: model.parent_definition_id.map(DefinitionId::from_uuid),
        index: model.index,
        is_posting: model.is_posting,
        name: model.name,
        name_in_total: model.name_in_total,
        child_entries: Vec::new(),
        linked_accounts: Vec::new(),
    }
}

pub(crate) fn grouping_from_model(model: statement_groupings::Model) -> StatementGrouping {
    StatementGrouping {
        id: model.id.into(),
        tenant: tenant(model.organization_id, model.branch_id),
        kind: model.kind.into(),
        name: model.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn account_row(account_type: &str) -> accounts::Model {
        let now = Utc::now().into();
        accounts::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            branch_id: Uuid::now_v7(),
            name: "Savings".to_string(),
            account_type: account_type.to_string(),
            general_ledger_type: Some(db::GeneralLedgerType::Liabilities),
            financial_statement_definition_id: Some(Uuid::now_v7()),
            financial_statement_index: 2.0,
            general_ledger_definition_id: None,
            general_ledger_index: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_account_row_maps_both_placements() {
        let row = account_row("Deposit");
        let fs_definition = row.financial_statement_definition_id;
        let account = account_from_model(row.clone());

        assert_eq!(account.id.into_inner(), row.id);
        assert_eq!(account.tenant.organization_id.into_inner(), row.organization_id);
        assert_eq!(account.tenant.branch_id.into_inner(), row.branch_id);
        assert_eq!(account.classification, AccountClassification::Deposit);
        assert_eq!(account.general_ledger_type, Some(GeneralLedgerType::Liabilities));
        assert_eq!(
            account.financial_statement_definition_id.map(DefinitionId::into_inner),
            fs_definition
        );
        assert_eq!(account.financial_statement_index.to_bits(), 2.0_f64.to_bits());
        assert_eq!(account.general_ledger_definition_id, None);
    }

    #[test]
    fn test_unknown_account_type_shown_as_other() {
        let account = account_from_model(account_row("Share Capital"));
        assert_eq!(account.classification, AccountClassification::Other);
    }

    #[test]
    fn test_definition_row_starts_unloaded() {
        let now = Utc::now().into();
        let row = statement_definitions::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            branch_id: Uuid::now_v7(),
            kind: db::HierarchyKind::GeneralLedger,
            grouping_id: Some(Uuid::now_v7()),
            parent_definition_id: None,
            index: 3,
            is_posting: true,
            name: "Cash".to_string(),
            name_in_total: Some("Total Cash".to_string()),
            created_at: now,
            updated_at: now,
        };
        let definition = definition_from_model(row);

        assert_eq!(definition.kind, HierarchyKind::GeneralLedger);
        assert_eq!(definition.index, 3);
        assert!(definition.is_posting);
        assert!(definition.child_entries.is_empty());
        assert!(definition.linked_accounts.is_empty());
    }

    #[rstest]
    #[case(HierarchyKind::FinancialStatement)]
    #[case(HierarchyKind::GeneralLedger)]
    fn test_hierarchy_kind_mapping(#[case] kind: HierarchyKind) {
        assert_eq!(HierarchyKind::from(db::HierarchyKind::from(kind)), kind);
    }

    #[test]
    fn test_ledger_source_mapping_covers_every_source() {
        for source in LedgerSource::ALL {
            assert_eq!(LedgerSource::from(db::LedgerSource::from(source)), source);
        }
    }

    #[test]
    fn test_general_ledger_type_mapping() {
        for gl_type in GeneralLedgerType::ALL {
            assert_eq!(GeneralLedgerType::from(db::GeneralLedgerType::from(gl_type)), gl_type);
        }
    }
}
