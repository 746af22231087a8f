//! Statement hierarchy domain types.

use std::fmt;

use coopledger_shared::TenantScope;
use coopledger_shared::types::{AccountId, DefinitionId, GroupingId, Tenanted};
use serde::{Deserialize, Serialize};

use super::ordering::SiblingAccess;
use crate::ledger::{AccountClassification, GeneralLedgerType};

/// Which reporting tree a definition or grouping belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyKind {
    /// Financial statement definitions.
    FinancialStatement,
    /// General ledger definitions.
    GeneralLedger,
}

impl HierarchyKind {
    /// Both hierarchies.
    pub const ALL: [Self; 2] = [Self::FinancialStatement, Self::GeneralLedger];

    /// Returns the stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinancialStatement => "financial_statement",
            Self::GeneralLedger => "general_ledger",
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that owns a sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParentKey {
    /// Accounts linked to a definition.
    Definition(DefinitionId),
    /// Definitions placed in a grouping.
    Grouping(GroupingId),
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition(id) => write!(f, "definition:{id}"),
            Self::Grouping(id) => write!(f, "grouping:{id}"),
        }
    }
}

/// Derived link state of an account in one hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMembership {
    /// Not placed under any definition.
    Unlinked,
    /// Placed under the given definition.
    LinkedTo(DefinitionId),
}

/// Derived shape of a definition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionShape {
    /// No child entries.
    Leaf,
    /// At least one child entry.
    HasChildren,
}

/// A chart of accounts entry as seen by the hierarchy.
///
/// Each hierarchy has its own link and position so reordering in one tree
/// never disturbs the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning organization and branch.
    pub tenant: TenantScope,
    /// Display name.
    pub name: String,
    /// Operational classification.
    pub classification: AccountClassification,
    /// Accounting element, when assigned.
    pub general_ledger_type: Option<GeneralLedgerType>,
    /// Financial statement definition this account is listed under.
    pub financial_statement_definition_id: Option<DefinitionId>,
    /// Position within the financial statement definition.
    pub financial_statement_index: f64,
    /// General ledger definition this account is listed under.
    pub general_ledger_definition_id: Option<DefinitionId>,
    /// Position within the general ledger definition.
    pub general_ledger_index: f64,
}

impl Account {
    /// Creates an unlinked account.
    #[must_use]
    pub fn new(
        tenant: TenantScope,
        name: impl Into<String>,
        classification: AccountClassification,
    ) -> Self {
        Self {
            id: AccountId::new(),
            tenant,
            name: name.into(),
            classification,
            general_ledger_type: None,
            financial_statement_definition_id: None,
            financial_statement_index: 0.0,
            general_ledger_definition_id: None,
            general_ledger_index: 0.0,
        }
    }

    /// Sibling accessors for the given hierarchy.
    #[must_use]
    pub const fn access(kind: HierarchyKind) -> SiblingAccess<Self, AccountId, DefinitionId, f64> {
        match kind {
            HierarchyKind::FinancialStatement => FINANCIAL_STATEMENT_ACCOUNTS,
            HierarchyKind::GeneralLedger => GENERAL_LEDGER_ACCOUNTS,
        }
    }

    /// The definition this account is linked to, if any.
    #[must_use]
    pub fn definition_id(&self, kind: HierarchyKind) -> Option<DefinitionId> {
        match kind {
            HierarchyKind::FinancialStatement => self.financial_statement_definition_id,
            HierarchyKind::GeneralLedger => self.general_ledger_definition_id,
        }
    }

    /// True when either link points at `definition`.
    #[must_use]
    pub fn links_to(&self, definition: DefinitionId) -> bool {
        HierarchyKind::ALL
            .into_iter()
            .any(|kind| self.definition_id(kind) == Some(definition))
    }

    /// Position among its siblings in the given hierarchy.
    #[must_use]
    pub fn index(&self, kind: HierarchyKind) -> f64 {
        match kind {
            HierarchyKind::FinancialStatement => self.financial_statement_index,
            HierarchyKind::GeneralLedger => self.general_ledger_index,
        }
    }

    /// Link state in the given hierarchy.
    #[must_use]
    pub fn membership(&self, kind: HierarchyKind) -> AccountMembership {
        self.definition_id(kind)
            .map_or(AccountMembership::Unlinked, AccountMembership::LinkedTo)
    }
}

impl Tenanted for Account {
    fn tenant(&self) -> TenantScope {
        self.tenant
    }
}

const FINANCIAL_STATEMENT_ACCOUNTS: SiblingAccess<Account, AccountId, DefinitionId, f64> =
    SiblingAccess {
        key: |account| account.id,
        parent: |account| account.financial_statement_definition_id,
        set_parent: |account, parent| account.financial_statement_definition_id = parent,
        index: |account| account.financial_statement_index,
        set_index: |account, index| account.financial_statement_index = index,
    };

const GENERAL_LEDGER_ACCOUNTS: SiblingAccess<Account, AccountId, DefinitionId, f64> =
    SiblingAccess {
        key: |account| account.id,
        parent: |account| account.general_ledger_definition_id,
        set_parent: |account, parent| account.general_ledger_definition_id = parent,
        index: |account| account.general_ledger_index,
        set_index: |account, index| account.general_ledger_index = index,
    };

/// A node in a reporting hierarchy.
///
/// `child_entries` and `linked_accounts` are loaded on demand by the store;
/// they are empty on a freshly fetched record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementDefinition {
    /// Definition ID.
    pub id: DefinitionId,
    /// Owning organization and branch.
    pub tenant: TenantScope,
    /// Which tree this node is part of.
    pub kind: HierarchyKind,
    /// Grouping this definition is placed in.
    pub grouping_id: Option<GroupingId>,
    /// Parent definition when this is a child entry.
    pub parent_definition_id: Option<DefinitionId>,
    /// Position within the grouping.
    pub index: i32,
    /// Whether entries may be posted directly to this node.
    pub is_posting: bool,
    /// Display name.
    pub name: String,
    /// Label used on the total line.
    pub name_in_total: Option<String>,
    /// Child definitions.
    #[serde(default)]
    pub child_entries: Vec<StatementDefinition>,
    /// Accounts listed under this definition, in index order.
    #[serde(default)]
    pub linked_accounts: Vec<Account>,
}

impl StatementDefinition {
    /// Creates an unplaced definition.
    #[must_use]
    pub fn new(tenant: TenantScope, kind: HierarchyKind, name: impl Into<String>) -> Self {
        Self {
            id: DefinitionId::new(),
            tenant,
            kind,
            grouping_id: None,
            parent_definition_id: None,
            index: 0,
            is_posting: false,
            name: name.into(),
            name_in_total: None,
            child_entries: Vec::new(),
            linked_accounts: Vec::new(),
        }
    }

    /// Leaf or branch, computed from the loaded child entries.
    #[must_use]
    pub fn shape(&self) -> DefinitionShape {
        if self.child_entries.is_empty() {
            DefinitionShape::Leaf
        } else {
            DefinitionShape::HasChildren
        }
    }
}

impl Tenanted for StatementDefinition {
    fn tenant(&self) -> TenantScope {
        self.tenant
    }
}

/// Sibling accessors for definitions within a grouping.
pub const DEFINITIONS_IN_GROUPING: SiblingAccess<StatementDefinition, DefinitionId, GroupingId, i32> =
    SiblingAccess {
        key: |definition| definition.id,
        parent: |definition| definition.grouping_id,
        set_parent: |definition, parent| definition.grouping_id = parent,
        index: |definition| definition.index,
        set_index: |definition, index| definition.index = index,
    };

/// Top-level bucket of definitions (e.g. "Assets", "Income").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementGrouping {
    /// Grouping ID.
    pub id: GroupingId,
    /// Owning organization and branch.
    pub tenant: TenantScope,
    /// Which tree this grouping is part of.
    pub kind: HierarchyKind,
    /// Display name.
    pub name: String,
}

impl StatementGrouping {
    /// Creates a grouping.
    #[must_use]
    pub fn new(tenant: TenantScope, kind: HierarchyKind, name: impl Into<String>) -> Self {
        Self {
            id: GroupingId::new(),
            tenant,
            kind,
            name: name.into(),
        }
    }
}

impl Tenanted for StatementGrouping {
    fn tenant(&self) -> TenantScope {
        self.tenant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coopledger_shared::types::{BranchId, OrganizationId};

    fn tenant() -> TenantScope {
        TenantScope::new(OrganizationId::new(), BranchId::new())
    }

    #[test]
    fn test_account_links_are_per_kind() {
        let mut account = Account::new(tenant(), "Savings", AccountClassification::Deposit);
        let definition = DefinitionId::new();
        account.financial_statement_definition_id = Some(definition);

        assert_eq!(
            account.membership(HierarchyKind::FinancialStatement),
            AccountMembership::LinkedTo(definition)
        );
        assert_eq!(
            account.membership(HierarchyKind::GeneralLedger),
            AccountMembership::Unlinked
        );
    }

    #[test]
    fn test_access_targets_matching_fields() {
        let mut account = Account::new(tenant(), "Loans", AccountClassification::Loan);
        let definition = DefinitionId::new();

        let access = Account::access(HierarchyKind::GeneralLedger);
        (access.set_parent)(&mut account, Some(definition));
        (access.set_index)(&mut account, 3.0);

        assert_eq!(account.general_ledger_definition_id, Some(definition));
        assert_eq!(account.index(HierarchyKind::GeneralLedger).to_bits(), 3.0f64.to_bits());
        assert_eq!(account.financial_statement_definition_id, None);
        assert_eq!(account.index(HierarchyKind::FinancialStatement).to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn test_definition_shape() {
        let scope = tenant();
        let mut parent = StatementDefinition::new(scope, HierarchyKind::FinancialStatement, "Assets");
        assert_eq!(parent.shape(), DefinitionShape::Leaf);

        parent
            .child_entries
            .push(StatementDefinition::new(scope, HierarchyKind::FinancialStatement, "Cash"));
        assert_eq!(parent.shape(), DefinitionShape::HasChildren);
    }

    #[test]
    fn test_parent_keys_order_deterministically() {
        let mut keys = vec![
            ParentKey::Grouping(GroupingId::new()),
            ParentKey::Definition(DefinitionId::new()),
        ];
        keys.sort();
        assert!(matches!(keys[0], ParentKey::Definition(_)));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(HierarchyKind::FinancialStatement.to_string(), "financial_statement");
        let json = serde_json::to_string(&HierarchyKind::GeneralLedger).unwrap();
        assert_eq!(json, "\"general_ledger\"");
    }
}
