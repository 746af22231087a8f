//! Multi-tenant scoping.
//!
//! Every account, definition, grouping and ledger entry belongs to exactly one
//! organization/branch pair. Records from different scopes must never be linked.

use serde::{Deserialize, Serialize};

use super::id::{BranchId, OrganizationId};

/// The organization + branch pair that partitions data between tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantScope {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Owning branch within the organization.
    pub branch_id: BranchId,
}

impl TenantScope {
    /// Creates a tenant scope.
    #[must_use]
    pub const fn new(organization_id: OrganizationId, branch_id: BranchId) -> Self {
        Self {
            organization_id,
            branch_id,
        }
    }

    /// Returns true when `other` is in this scope.
    #[must_use]
    pub fn contains<T: Tenanted + ?Sized>(&self, other: &T) -> bool {
        other.tenant() == *self
    }
}

impl std::fmt::Display for TenantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.organization_id, self.branch_id)
    }
}

/// Anything owned by a tenant scope.
pub trait Tenanted {
    /// The scope that owns this record.
    fn tenant(&self) -> TenantScope;

    /// Returns true when both records share organization and branch.
    fn same_tenant<T: Tenanted + ?Sized>(&self, other: &T) -> bool {
        self.tenant() == other.tenant()
    }
}

impl Tenanted for TenantScope {
    fn tenant(&self) -> TenantScope {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tenant_requires_matching_branch() {
        let org = OrganizationId::new();
        let main = TenantScope::new(org, BranchId::new());
        let other_branch = TenantScope::new(org, BranchId::new());

        assert!(main.same_tenant(&main));
        assert!(!main.same_tenant(&other_branch));
        assert!(!main.contains(&other_branch));
    }

    #[test]
    fn test_same_tenant_requires_matching_organization() {
        let branch = BranchId::new();
        let a = TenantScope::new(OrganizationId::new(), branch);
        let b = TenantScope::new(OrganizationId::new(), branch);

        assert!(!a.same_tenant(&b));
    }

    #[test]
    fn test_display() {
        let scope = TenantScope::new(OrganizationId::new(), BranchId::new());
        assert_eq!(
            scope.to_string(),
            format!("{}/{}", scope.organization_id, scope.branch_id)
        );
    }
}
