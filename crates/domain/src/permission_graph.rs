use std::collections::{BTreeMap, BTreeSet, VecDeque};

use assetflow_core::{AppError, AppResult};

use crate::capability::Capability;
use crate::role::{Role, RolePolicy};
use crate::user::User;

/// Declared capability dependencies: granting the child requires every
/// parent; revoking any parent revokes the child.
const STANDARD_DEPENDENCIES: &[(Capability, Capability)] = &[
    (Capability::AssetCreate, Capability::AssetView),
    (Capability::AssetEdit, Capability::AssetView),
    (Capability::AssetDelete, Capability::AssetEdit),
    (Capability::AssetHandover, Capability::AssetView),
    (Capability::AssetLoan, Capability::AssetView),
    (Capability::AssetDismantle, Capability::AssetEdit),
    (Capability::AssetRepair, Capability::AssetView),
    (Capability::AssetRetire, Capability::AssetEdit),
    (Capability::RequestCreate, Capability::RequestView),
    (Capability::RequestCancelOwn, Capability::RequestCreate),
    (Capability::RequestApproveLogistics, Capability::RequestView),
    (Capability::RequestApprovePurchasing, Capability::RequestView),
    (Capability::RequestApproveFinal, Capability::RequestView),
    (Capability::UserManage, Capability::UserView),
];

/// Dependency graph over capabilities plus the role grant policy.
///
/// Built once at application start from the immutable declarations and
/// shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityGraph {
    parents: BTreeMap<Capability, BTreeSet<Capability>>,
    children: BTreeMap<Capability, BTreeSet<Capability>>,
    policy: RolePolicy,
}

impl CapabilityGraph {
    /// Creates a graph from `(child, parent)` dependency edges and a role policy.
    ///
    /// Fails with a configuration error when the declared edges contain a
    /// cycle, since that indicates a corrupted capability declaration.
    pub fn new(
        dependencies: impl IntoIterator<Item = (Capability, Capability)>,
        policy: RolePolicy,
    ) -> AppResult<Self> {
        let mut parents: BTreeMap<Capability, BTreeSet<Capability>> = BTreeMap::new();
        let mut children: BTreeMap<Capability, BTreeSet<Capability>> = BTreeMap::new();

        for (child, parent) in dependencies {
            if child == parent {
                return Err(AppError::Configuration(format!(
                    "capability '{}' must not depend on itself",
                    child.as_str()
                )));
            }

            parents.entry(child).or_default().insert(parent);
            children.entry(parent).or_default().insert(child);
        }

        let graph = Self {
            parents,
            children,
            policy,
        };
        graph.assert_acyclic()?;

        Ok(graph)
    }

    /// Creates the graph from the standard dependency declarations and policy.
    pub fn standard() -> AppResult<Self> {
        Self::new(STANDARD_DEPENDENCIES.iter().copied(), RolePolicy::standard())
    }

    /// Returns the role grant policy the graph evaluates against.
    #[must_use]
    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    /// Returns all transitive parents of a capability.
    ///
    /// A capability with no declared dependencies yields the empty set. The
    /// traversal tracks visited nodes, so it terminates even if the acyclic
    /// invariant were ever violated.
    #[must_use]
    pub fn ancestors(&self, capability: Capability) -> BTreeSet<Capability> {
        self.traverse(capability, &self.parents)
    }

    /// Returns all transitive children of a capability.
    #[must_use]
    pub fn descendants(&self, capability: Capability) -> BTreeSet<Capability> {
        self.traverse(capability, &self.children)
    }

    /// Returns the selection after granting a capability.
    ///
    /// Selecting a capability auto-selects every ancestor it requires.
    #[must_use]
    pub fn with_ancestors(
        &self,
        selected: &BTreeSet<Capability>,
        capability: Capability,
    ) -> BTreeSet<Capability> {
        let mut next = selected.clone();
        next.insert(capability);
        next.extend(self.ancestors(capability));
        next
    }

    /// Returns the selection after revoking a capability.
    ///
    /// Deselecting a capability auto-deselects every descendant that
    /// depended on it.
    #[must_use]
    pub fn without_descendants(
        &self,
        selected: &BTreeSet<Capability>,
        capability: Capability,
    ) -> BTreeSet<Capability> {
        let mut next = selected.clone();
        next.remove(&capability);
        for descendant in self.descendants(capability) {
            next.remove(&descendant);
        }
        next
    }

    /// Resolves the effective capability set for a user.
    ///
    /// Super admins always resolve to the universal set. For every other
    /// role the stored permissions are stripped of restricted capabilities
    /// and joined with the mandatory grants; restriction wins when a
    /// capability is declared both mandatory and restricted.
    #[must_use]
    pub fn effective_permissions(&self, user: &User) -> BTreeSet<Capability> {
        if user.role() == Role::SuperAdmin {
            return Capability::all().iter().copied().collect();
        }

        self.sanitize(user.permissions(), user.role())
    }

    /// Returns whether a user holds a capability.
    ///
    /// Restricted capabilities evaluate to false even when present in the
    /// stored permission set, which defends against stale or tampered
    /// stored grants.
    #[must_use]
    pub fn has_permission(&self, user: &User, capability: Capability) -> bool {
        if user.role() == Role::SuperAdmin {
            return true;
        }

        if self
            .policy
            .grants(user.role())
            .restricted()
            .contains(&capability)
        {
            return false;
        }

        user.permissions().contains(&capability)
    }

    /// Returns a permission set safe to persist for a role.
    ///
    /// Applies the same restriction-then-injection rule as
    /// [`Self::effective_permissions`].
    #[must_use]
    pub fn sanitize(
        &self,
        permissions: &BTreeSet<Capability>,
        role: Role,
    ) -> BTreeSet<Capability> {
        let restricted = self.policy.grants(role).restricted();
        let mut sanitized: BTreeSet<Capability> =
            permissions.difference(restricted).copied().collect();
        sanitized.extend(self.policy.safe_mandatory(role));
        sanitized
    }

    fn traverse(
        &self,
        start: Capability,
        edges: &BTreeMap<Capability, BTreeSet<Capability>>,
    ) -> BTreeSet<Capability> {
        let mut reached = BTreeSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let Some(next) = edges.get(&current) else {
                continue;
            };

            for capability in next {
                if *capability != start && reached.insert(*capability) {
                    queue.push_back(*capability);
                }
            }
        }

        reached
    }

    fn assert_acyclic(&self) -> AppResult<()> {
        let mut remaining: BTreeMap<Capability, usize> = self
            .parents
            .iter()
            .map(|(child, parents)| (*child, parents.len()))
            .collect();
        let mut queue: VecDeque<Capability> = Capability::all()
            .iter()
            .filter(|capability| !remaining.contains_key(capability))
            .copied()
            .collect();

        while let Some(current) = queue.pop_front() {
            let Some(dependents) = self.children.get(&current) else {
                continue;
            };

            for dependent in dependents {
                let Some(count) = remaining.get_mut(dependent) else {
                    continue;
                };

                *count -= 1;
                if *count == 0 {
                    remaining.remove(dependent);
                    queue.push_back(*dependent);
                }
            }
        }

        if remaining.is_empty() {
            return Ok(());
        }

        let cyclic: Vec<&str> = remaining.keys().map(Capability::as_str).collect();
        Err(AppError::Configuration(format!(
            "capability dependency cycle involving: {}",
            cyclic.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use proptest::prelude::*;

    use super::CapabilityGraph;
    use crate::capability::Capability;
    use crate::role::{Role, RoleGrants, RolePolicy};
    use crate::user::User;

    fn graph() -> CapabilityGraph {
        match CapabilityGraph::standard() {
            Ok(graph) => graph,
            Err(error) => panic!("standard graph must construct: {error}"),
        }
    }

    fn user(role: Role, permissions: impl IntoIterator<Item = Capability>) -> User {
        match User::new("user-1", role, permissions) {
            Ok(user) => user,
            Err(error) => panic!("user must construct: {error}"),
        }
    }

    #[test]
    fn ancestors_are_transitive() {
        let ancestors = graph().ancestors(Capability::AssetDelete);
        let expected: BTreeSet<Capability> =
            [Capability::AssetEdit, Capability::AssetView].into();
        assert_eq!(ancestors, expected);
    }

    #[test]
    fn leaf_capability_has_no_ancestors() {
        assert!(graph().ancestors(Capability::AssetView).is_empty());
    }

    #[test]
    fn descendants_mirror_ancestors() {
        let graph = graph();
        let descendants = graph.descendants(Capability::AssetView);
        for descendant in &descendants {
            assert!(graph.ancestors(*descendant).contains(&Capability::AssetView));
        }
        assert!(descendants.contains(&Capability::AssetDelete));
    }

    #[test]
    fn cycle_is_rejected_at_construction() {
        let result = CapabilityGraph::new(
            [
                (Capability::AssetView, Capability::AssetEdit),
                (Capability::AssetEdit, Capability::AssetDelete),
                (Capability::AssetDelete, Capability::AssetView),
            ],
            RolePolicy::standard(),
        );
        assert!(matches!(
            result,
            Err(assetflow_core::AppError::Configuration(_))
        ));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let result = CapabilityGraph::new(
            [(Capability::AssetView, Capability::AssetView)],
            RolePolicy::standard(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn super_admin_holds_every_capability() {
        let graph = graph();
        let super_admin = user(Role::SuperAdmin, []);
        for capability in Capability::all() {
            assert!(graph.has_permission(&super_admin, *capability));
        }
        assert_eq!(
            graph.effective_permissions(&super_admin).len(),
            Capability::all().len()
        );
    }

    #[test]
    fn restricted_capability_is_denied_despite_stored_grant() {
        let graph = graph();
        let staff = user(Role::Staff, [Capability::RequestApproveFinal]);
        assert!(!graph.has_permission(&staff, Capability::RequestApproveFinal));
    }

    #[test]
    fn stored_grant_is_honored_when_not_restricted() {
        let graph = graph();
        let staff = user(Role::Staff, [Capability::RequestCreate]);
        assert!(graph.has_permission(&staff, Capability::RequestCreate));
        assert!(!graph.has_permission(&staff, Capability::AssetCreate));
    }

    #[test]
    fn restriction_wins_over_conflicting_mandatory_grant() {
        let mut grants = BTreeMap::new();
        grants.insert(
            Role::Staff,
            RoleGrants::new(
                [],
                [Capability::UserManage, Capability::RequestView],
                [Capability::UserManage],
            ),
        );
        let graph = match CapabilityGraph::new([], RolePolicy::new(grants)) {
            Ok(graph) => graph,
            Err(error) => panic!("graph must construct: {error}"),
        };

        let staff = user(Role::Staff, [Capability::UserManage]);
        let effective = graph.effective_permissions(&staff);
        assert!(!effective.contains(&Capability::UserManage));
        assert!(effective.contains(&Capability::RequestView));
    }

    #[test]
    fn sanitize_strips_restricted_and_injects_mandatory() {
        let graph = graph();
        let stored: BTreeSet<Capability> =
            [Capability::RequestApproveFinal, Capability::AssetView].into();

        let sanitized = graph.sanitize(&stored, Role::Staff);
        assert!(!sanitized.contains(&Capability::RequestApproveFinal));
        assert!(sanitized.contains(&Capability::AssetView));
        assert!(sanitized.contains(&Capability::RequestView));
    }

    #[test]
    fn selecting_a_capability_selects_its_ancestors() {
        let graph = graph();
        let selected = graph.with_ancestors(&BTreeSet::new(), Capability::AssetDelete);
        let expected: BTreeSet<Capability> = [
            Capability::AssetDelete,
            Capability::AssetEdit,
            Capability::AssetView,
        ]
        .into();
        assert_eq!(selected, expected);
    }

    #[test]
    fn deselecting_a_capability_deselects_its_descendants() {
        let graph = graph();
        let selected: BTreeSet<Capability> = [
            Capability::AssetView,
            Capability::AssetEdit,
            Capability::AssetDelete,
            Capability::RequestView,
        ]
        .into();

        let remaining = graph.without_descendants(&selected, Capability::AssetView);
        let expected: BTreeSet<Capability> = [Capability::RequestView].into();
        assert_eq!(remaining, expected);
    }

    proptest! {
        #[test]
        fn ancestor_closure_is_idempotent(index in 0..Capability::all().len()) {
            let graph = graph();
            let capability = Capability::all()[index];

            let closure = graph.ancestors(capability);
            let mut widened = closure.clone();
            for ancestor in &closure {
                widened.extend(graph.ancestors(*ancestor));
            }

            prop_assert_eq!(closure, widened);
        }

        #[test]
        fn effective_permissions_never_contain_restricted(
            index in 0..Capability::all().len(),
            role_index in 0..Role::all().len(),
        ) {
            let graph = graph();
            let role = Role::all()[role_index];
            prop_assume!(role != Role::SuperAdmin);

            let stored = Capability::all()[index];
            let account = user(role, [stored]);
            let effective = graph.effective_permissions(&account);
            for restricted in graph.policy().grants(role).restricted() {
                prop_assert!(!effective.contains(restricted));
            }
        }
    }
}
