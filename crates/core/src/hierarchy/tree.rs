//! Linking and deletion rules for statement definitions.
//!
//! These functions work on records already loaded by the caller. They never
//! touch storage; [`HierarchyService`](super::service::HierarchyService)
//! wraps them in a transaction.

use coopledger_shared::types::{AccountId, DefinitionId, Tenanted};

use super::error::{DependentKind, EntityRef, HierarchyError};
use super::ordering::{OrderedSiblingList, Reordered, reorder};
use super::types::{Account, DEFINITIONS_IN_GROUPING, StatementDefinition, StatementGrouping};

/// Integrity rules for the statement hierarchy.
pub struct StatementTree;

impl StatementTree {
    /// Moves `account` to `target` among the definition's linked accounts.
    ///
    /// An account linked elsewhere (or nowhere) is attached to `definition`
    /// as part of the same move. `definition.linked_accounts` must hold the
    /// current siblings and is updated in place. Returns the accounts that
    /// need a write.
    pub fn reorder_account(
        definition: &mut StatementDefinition,
        account: Account,
        target: i64,
    ) -> Result<Vec<AccountId>, HierarchyError> {
        ensure_same_tenant(
            &account,
            EntityRef::Account(account.id),
            definition,
            EntityRef::Definition(definition.id),
        )?;

        let mut list = OrderedSiblingList::new(
            definition.id,
            std::mem::take(&mut definition.linked_accounts),
            Account::access(definition.kind),
        );
        let changed = list.reorder(account, target);
        definition.linked_accounts = list.into_items();
        Ok(changed)
    }

    /// Links `account` to `definition`, appending it after the current
    /// siblings. Linking an account that is already a member keeps its
    /// position.
    pub fn link_account(
        definition: &mut StatementDefinition,
        account: Account,
    ) -> Result<Vec<AccountId>, HierarchyError> {
        if account.definition_id(definition.kind) != Some(definition.id) {
            return Self::reorder_account(definition, account, i64::MAX);
        }

        ensure_same_tenant(
            &account,
            EntityRef::Account(account.id),
            definition,
            EntityRef::Definition(definition.id),
        )?;
        let mut list = OrderedSiblingList::new(
            definition.id,
            std::mem::take(&mut definition.linked_accounts),
            Account::access(definition.kind),
        );
        if list.position(account.id).is_none() {
            return Ok(Self::place(definition, list, account));
        }
        let changed = list.renumber();
        definition.linked_accounts = list.into_items();
        Ok(changed)
    }

    /// Clears the account's link and closes the gap it leaves.
    ///
    /// Returns the remaining siblings whose index changed; `account` itself
    /// always needs a write.
    pub fn unlink_account(definition: &mut StatementDefinition, account: &mut Account) -> Vec<AccountId> {
        let access = Account::access(definition.kind);
        let mut list = OrderedSiblingList::new(
            definition.id,
            std::mem::take(&mut definition.linked_accounts),
            access,
        );
        let changed = match list.remove(account.id) {
            Some((_, changed)) => changed,
            None => list.renumber(),
        };
        (access.set_parent)(account, None);
        definition.linked_accounts = list.into_items();
        changed
    }

    /// Moves a definition to `target` within a grouping.
    ///
    /// `siblings` are the grouping's current definitions. A definition from
    /// another grouping is attached as part of the move.
    pub fn move_definition(
        grouping: &StatementGrouping,
        siblings: Vec<StatementDefinition>,
        definition: StatementDefinition,
        target: i64,
    ) -> Result<Reordered<StatementDefinition, DefinitionId>, HierarchyError> {
        if definition.kind != grouping.kind {
            return Err(HierarchyError::KindMismatch {
                expected: grouping.kind,
                found: definition.kind,
            });
        }
        ensure_same_tenant(
            &definition,
            EntityRef::Definition(definition.id),
            grouping,
            EntityRef::Grouping(grouping.id),
        )?;

        Ok(reorder(
            grouping.id,
            siblings,
            definition,
            target,
            DEFINITIONS_IN_GROUPING,
        ))
    }

    /// Checks that a definition can be deleted.
    ///
    /// `accounts` must be the result of scanning accounts by their stored
    /// links, not the definition's cached `linked_accounts`. A link in either
    /// hierarchy blocks the delete. Child entries are checked first.
    pub fn check_delete<'a, I>(definition: &StatementDefinition, accounts: I) -> Result<(), HierarchyError>
    where
        I: IntoIterator<Item = &'a Account>,
    {
        if !definition.child_entries.is_empty() {
            return Err(HierarchyError::HasDependents {
                reason: DependentKind::SubEntries,
            });
        }

        let linked = accounts
            .into_iter()
            .any(|account| account.links_to(definition.id));
        if linked {
            return Err(HierarchyError::HasDependents {
                reason: DependentKind::LinkedAccounts,
            });
        }

        Ok(())
    }

    /// Returns true when [`check_delete`](Self::check_delete) passes.
    pub fn can_delete<'a, I>(definition: &StatementDefinition, accounts: I) -> bool
    where
        I: IntoIterator<Item = &'a Account>,
    {
        Self::check_delete(definition, accounts).is_ok()
    }

    fn place(
        definition: &mut StatementDefinition,
        mut list: OrderedSiblingList<Account, AccountId, DefinitionId, f64>,
        account: Account,
    ) -> Vec<AccountId> {
        let changed = list.reorder(account, i64::MAX);
        definition.linked_accounts = list.into_items();
        changed
    }
}

fn ensure_same_tenant<A, B>(
    child: &A,
    child_ref: EntityRef,
    parent: &B,
    parent_ref: EntityRef,
) -> Result<(), HierarchyError>
where
    A: Tenanted + ?Sized,
    B: Tenanted + ?Sized,
{
    if child.same_tenant(parent) {
        Ok(())
    } else {
        Err(HierarchyError::CrossTenantLink {
            child: child_ref,
            parent: parent_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coopledger_shared::TenantScope;
    use coopledger_shared::types::{BranchId, OrganizationId};

    use crate::hierarchy::types::HierarchyKind;
    use crate::ledger::AccountClassification;

    const FS: HierarchyKind = HierarchyKind::FinancialStatement;

    fn tenant() -> TenantScope {
        TenantScope::new(OrganizationId::new(), BranchId::new())
    }

    fn account(scope: TenantScope, name: &str) -> Account {
        Account::new(scope, name, AccountClassification::Deposit)
    }

    /// A definition with `names` linked in order.
    fn definition_with(scope: TenantScope, names: &[&str]) -> StatementDefinition {
        let mut definition = StatementDefinition::new(scope, FS, "Current Assets");
        for name in names {
            let placed = account(scope, name);
            StatementTree::link_account(&mut definition, placed).unwrap();
        }
        definition
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn names(definition: &StatementDefinition) -> Vec<(&str, u32)> {
        definition
            .linked_accounts
            .iter()
            .map(|a| (a.name.as_str(), a.financial_statement_index as u32))
            .collect()
    }

    #[test]
    fn test_link_appends_in_order() {
        let definition = definition_with(tenant(), &["Cash", "Savings", "Time Deposit"]);

        assert_eq!(
            names(&definition),
            vec![("Cash", 0), ("Savings", 1), ("Time Deposit", 2)]
        );
        assert!(definition
            .linked_accounts
            .iter()
            .all(|a| a.financial_statement_definition_id == Some(definition.id)));
    }

    #[test]
    fn test_relinking_member_keeps_position() {
        let mut definition = definition_with(tenant(), &["Cash", "Savings", "Time Deposit"]);
        let cash = definition.linked_accounts[0].clone();

        let changed = StatementTree::link_account(&mut definition, cash).unwrap();

        assert!(changed.is_empty());
        assert_eq!(names(&definition)[0], ("Cash", 0));
    }

    #[test]
    fn test_reorder_within_definition() {
        let mut definition = definition_with(tenant(), &["A", "B", "C"]);
        let c = definition.linked_accounts[2].clone();

        let changed = StatementTree::reorder_account(&mut definition, c, 0).unwrap();

        assert_eq!(names(&definition), vec![("C", 0), ("A", 1), ("B", 2)]);
        assert_eq!(changed.len(), 3);
    }

    #[test]
    fn test_cross_attach_between_definitions() {
        let scope = tenant();
        let d1 = definition_with(scope, &["Moving", "Stays"]);
        let mut d2 = definition_with(scope, &["X", "Y"]);
        let moving = d1.linked_accounts[0].clone();
        assert_eq!(moving.financial_statement_definition_id, Some(d1.id));

        let changed = StatementTree::reorder_account(&mut d2, moving.clone(), 0).unwrap();

        let attached = &d2.linked_accounts[0];
        assert_eq!(attached.id, moving.id);
        assert_eq!(attached.financial_statement_definition_id, Some(d2.id));
        assert_eq!(attached.financial_statement_index.to_bits(), 0.0f64.to_bits());
        assert!(changed.contains(&moving.id));
        assert_eq!(names(&d2), vec![("Moving", 0), ("X", 1), ("Y", 2)]);
    }

    #[test]
    fn test_cross_tenant_link_is_rejected() {
        let mut definition = definition_with(tenant(), &["Cash"]);
        let foreign = account(tenant(), "Foreign");
        let foreign_id = foreign.id;

        let err = StatementTree::link_account(&mut definition, foreign).unwrap_err();

        assert!(matches!(
            err,
            HierarchyError::CrossTenantLink { child: EntityRef::Account(id), .. } if id == foreign_id
        ));
        assert_eq!(names(&definition), vec![("Cash", 0)]);
    }

    #[test]
    fn test_same_org_different_branch_is_cross_tenant() {
        let scope = tenant();
        let mut definition = definition_with(scope, &[]);
        let other_branch = TenantScope::new(scope.organization_id, BranchId::new());

        let result = StatementTree::link_account(&mut definition, account(other_branch, "Branch 2"));

        assert!(matches!(result, Err(HierarchyError::CrossTenantLink { .. })));
    }

    #[test]
    fn test_unlink_closes_gap() {
        let mut definition = definition_with(tenant(), &["A", "B", "C"]);
        let mut a = definition.linked_accounts[0].clone();

        let changed = StatementTree::unlink_account(&mut definition, &mut a);

        assert_eq!(a.financial_statement_definition_id, None);
        assert_eq!(names(&definition), vec![("B", 0), ("C", 1)]);
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn test_delete_blocked_by_sub_entries() {
        let scope = tenant();
        let mut definition = StatementDefinition::new(scope, FS, "Assets");
        definition
            .child_entries
            .push(StatementDefinition::new(scope, FS, "Cash"));

        let err = StatementTree::check_delete(&definition, std::iter::empty()).unwrap_err();

        assert!(matches!(
            err,
            HierarchyError::HasDependents { reason: DependentKind::SubEntries }
        ));
    }

    #[test]
    fn test_delete_blocked_by_linked_accounts() {
        let scope = tenant();
        let definition = StatementDefinition::new(scope, FS, "Assets");
        let mut linked = account(scope, "Cash");
        linked.financial_statement_definition_id = Some(definition.id);

        // The cached list is empty; the scan still finds the link.
        assert!(definition.linked_accounts.is_empty());
        let err = StatementTree::check_delete(&definition, &[linked]).unwrap_err();

        assert!(matches!(
            err,
            HierarchyError::HasDependents { reason: DependentKind::LinkedAccounts }
        ));
    }

    #[test]
    fn test_delete_allowed_without_dependents() {
        let scope = tenant();
        let definition = StatementDefinition::new(scope, FS, "Assets");
        let mut elsewhere = account(scope, "Cash");
        elsewhere.financial_statement_definition_id = Some(DefinitionId::new());
        elsewhere.general_ledger_definition_id = Some(DefinitionId::new());

        assert!(StatementTree::can_delete(&definition, &[elsewhere]));
        assert!(StatementTree::check_delete(&definition, std::iter::empty()).is_ok());
    }

    #[test]
    fn test_delete_blocked_by_link_in_other_hierarchy() {
        let scope = tenant();
        let definition = StatementDefinition::new(scope, FS, "Assets");
        let mut general_ledger_only = account(scope, "Savings");
        general_ledger_only.general_ledger_definition_id = Some(definition.id);

        let err = StatementTree::check_delete(&definition, &[general_ledger_only]).unwrap_err();

        assert!(matches!(
            err,
            HierarchyError::HasDependents { reason: DependentKind::LinkedAccounts }
        ));
    }

    #[test]
    fn test_move_definition_between_groupings() {
        let scope = tenant();
        let grouping = StatementGrouping::new(scope, FS, "Assets");
        let siblings: Vec<_> = ["Cash", "Receivables"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let mut d = StatementDefinition::new(scope, FS, name);
                d.grouping_id = Some(grouping.id);
                d.index = i32::try_from(i).unwrap();
                d
            })
            .collect();
        let mut moving = StatementDefinition::new(scope, FS, "Inventory");
        moving.grouping_id = Some(StatementGrouping::new(scope, FS, "Other").id);
        moving.index = 4;

        let result = StatementTree::move_definition(&grouping, siblings, moving, 1).unwrap();

        let order: Vec<_> = result
            .siblings
            .iter()
            .map(|d| (d.name.as_str(), d.index))
            .collect();
        assert_eq!(order, vec![("Cash", 0), ("Inventory", 1), ("Receivables", 2)]);
        assert!(result.siblings.iter().all(|d| d.grouping_id == Some(grouping.id)));
        assert_eq!(result.changed.len(), 2);
    }

    #[test]
    fn test_move_definition_rejects_other_hierarchy() {
        let scope = tenant();
        let grouping = StatementGrouping::new(scope, HierarchyKind::GeneralLedger, "Assets");
        let definition = StatementDefinition::new(scope, FS, "Cash");

        let err = StatementTree::move_definition(&grouping, Vec::new(), definition, 0).unwrap_err();

        assert!(matches!(
            err,
            HierarchyError::KindMismatch {
                expected: HierarchyKind::GeneralLedger,
                found: HierarchyKind::FinancialStatement,
            }
        ));
    }

    #[test]
    fn test_move_definition_rejects_cross_tenant() {
        let grouping = StatementGrouping::new(tenant(), FS, "Assets");
        let definition = StatementDefinition::new(tenant(), FS, "Cash");

        let err = StatementTree::move_definition(&grouping, Vec::new(), definition, 0).unwrap_err();

        assert!(matches!(err, HierarchyError::CrossTenantLink { .. }));
    }
}
