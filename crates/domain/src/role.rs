use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use assetflow_core::AppError;
use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// Roles assignable to user accounts. Exactly one role per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted administrator. Always resolves to the universal capability set.
    SuperAdmin,
    /// Warehouse administrator handling the logistics stage and asset registration.
    LogisticsAdmin,
    /// Procurement administrator handling purchasing and delivery tracking.
    PurchasingAdmin,
    /// Final approver for procurement requests.
    Leader,
    /// Regular requester.
    Staff,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::LogisticsAdmin => "logistics_admin",
            Self::PurchasingAdmin => "purchasing_admin",
            Self::Leader => "leader",
            Self::Staff => "staff",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::SuperAdmin,
            Role::LogisticsAdmin,
            Role::PurchasingAdmin,
            Role::Leader,
            Role::Staff,
        ];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|role| role.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown role value '{value}'")))
    }
}

/// Capability grants declared for one role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleGrants {
    defaults: BTreeSet<Capability>,
    mandatory: BTreeSet<Capability>,
    restricted: BTreeSet<Capability>,
}

impl RoleGrants {
    /// Creates a grant declaration from default, mandatory, and restricted sets.
    #[must_use]
    pub fn new(
        defaults: impl IntoIterator<Item = Capability>,
        mandatory: impl IntoIterator<Item = Capability>,
        restricted: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            defaults: defaults.into_iter().collect(),
            mandatory: mandatory.into_iter().collect(),
            restricted: restricted.into_iter().collect(),
        }
    }

    /// Returns capabilities granted to new accounts with the role.
    #[must_use]
    pub fn defaults(&self) -> &BTreeSet<Capability> {
        &self.defaults
    }

    /// Returns capabilities always granted regardless of stored data.
    #[must_use]
    pub fn mandatory(&self) -> &BTreeSet<Capability> {
        &self.mandatory
    }

    /// Returns capabilities never grantable, even if present in stored data.
    #[must_use]
    pub fn restricted(&self) -> &BTreeSet<Capability> {
        &self.restricted
    }
}

/// Immutable per-role grant configuration, constructed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    grants: BTreeMap<Role, RoleGrants>,
}

impl RolePolicy {
    /// Creates a policy from explicit per-role grant declarations.
    ///
    /// Roles missing from the declaration resolve to empty grant sets.
    #[must_use]
    pub fn new(grants: BTreeMap<Role, RoleGrants>) -> Self {
        Self { grants }
    }

    /// Returns the standard grant configuration shipped with the application.
    #[must_use]
    pub fn standard() -> Self {
        use Capability::*;

        let mut grants = BTreeMap::new();

        grants.insert(
            Role::SuperAdmin,
            RoleGrants::new(Capability::all().iter().copied(), [], []),
        );
        grants.insert(
            Role::LogisticsAdmin,
            RoleGrants::new(
                [
                    RequestView,
                    RequestApproveLogistics,
                    AssetView,
                    AssetCreate,
                    AssetEdit,
                    AssetHandover,
                    AssetLoan,
                    AssetDismantle,
                    AssetRepair,
                    AssetRetire,
                    ReportView,
                ],
                [AssetView, RequestView],
                [RequestApproveFinal, UserManage],
            ),
        );
        grants.insert(
            Role::PurchasingAdmin,
            RoleGrants::new(
                [RequestView, RequestApprovePurchasing, AssetView, ReportView],
                [RequestView],
                [RequestApproveFinal, UserManage],
            ),
        );
        grants.insert(
            Role::Leader,
            RoleGrants::new(
                [
                    RequestView,
                    RequestApproveFinal,
                    AssetView,
                    ReportView,
                    UserView,
                ],
                [RequestView],
                [UserManage],
            ),
        );
        grants.insert(
            Role::Staff,
            RoleGrants::new(
                [RequestView, RequestCreate, RequestCancelOwn, AssetView],
                [RequestView],
                [
                    RequestApproveLogistics,
                    RequestApprovePurchasing,
                    RequestApproveFinal,
                    AssetDelete,
                    UserManage,
                ],
            ),
        );

        Self { grants }
    }

    /// Returns the grant declaration for a role.
    #[must_use]
    pub fn grants(&self, role: Role) -> &RoleGrants {
        static EMPTY: RoleGrants = RoleGrants {
            defaults: BTreeSet::new(),
            mandatory: BTreeSet::new(),
            restricted: BTreeSet::new(),
        };

        self.grants.get(&role).unwrap_or(&EMPTY)
    }

    /// Returns mandatory capabilities minus restricted ones for a role.
    ///
    /// Restriction always wins over a conflicting mandatory declaration.
    #[must_use]
    pub fn safe_mandatory(&self, role: Role) -> BTreeSet<Capability> {
        let grants = self.grants(role);
        grants
            .mandatory()
            .difference(grants.restricted())
            .copied()
            .collect()
    }
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::standard()
    }
}
