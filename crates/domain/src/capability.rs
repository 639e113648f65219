use std::str::FromStr;

use assetflow_core::AppError;
use serde::{Deserialize, Serialize};

/// Capabilities enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows viewing registered assets.
    AssetView,
    /// Allows registering new assets.
    AssetCreate,
    /// Allows editing registered assets.
    AssetEdit,
    /// Allows deleting registered assets.
    AssetDelete,
    /// Allows creating handover documents.
    AssetHandover,
    /// Allows recording asset loans.
    AssetLoan,
    /// Allows dismantling assets into parts.
    AssetDismantle,
    /// Allows recording asset repairs.
    AssetRepair,
    /// Allows retiring assets from service.
    AssetRetire,
    /// Allows viewing procurement requests.
    RequestView,
    /// Allows submitting procurement requests.
    RequestCreate,
    /// Allows cancelling one's own pending requests.
    RequestCancelOwn,
    /// Allows the logistics approval stage on requests.
    RequestApproveLogistics,
    /// Allows the purchasing stage on requests.
    RequestApprovePurchasing,
    /// Allows the final approval stage on requests.
    RequestApproveFinal,
    /// Allows viewing user accounts.
    UserView,
    /// Allows managing user accounts and their grants.
    UserManage,
    /// Allows viewing reports.
    ReportView,
}

impl Capability {
    /// Returns a stable storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssetView => "assets.view",
            Self::AssetCreate => "assets.create",
            Self::AssetEdit => "assets.edit",
            Self::AssetDelete => "assets.delete",
            Self::AssetHandover => "assets.handover",
            Self::AssetLoan => "assets.loan",
            Self::AssetDismantle => "assets.dismantle",
            Self::AssetRepair => "assets.repair",
            Self::AssetRetire => "assets.retire",
            Self::RequestView => "requests.view",
            Self::RequestCreate => "requests.create",
            Self::RequestCancelOwn => "requests.cancel_own",
            Self::RequestApproveLogistics => "requests.approve_logistics",
            Self::RequestApprovePurchasing => "requests.approve_purchasing",
            Self::RequestApproveFinal => "requests.approve_final",
            Self::UserView => "users.view",
            Self::UserManage => "users.manage",
            Self::ReportView => "reports.view",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::AssetView,
            Capability::AssetCreate,
            Capability::AssetEdit,
            Capability::AssetDelete,
            Capability::AssetHandover,
            Capability::AssetLoan,
            Capability::AssetDismantle,
            Capability::AssetRepair,
            Capability::AssetRetire,
            Capability::RequestView,
            Capability::RequestCreate,
            Capability::RequestCancelOwn,
            Capability::RequestApproveLogistics,
            Capability::RequestApprovePurchasing,
            Capability::RequestApproveFinal,
            Capability::UserView,
            Capability::UserManage,
            Capability::ReportView,
        ];

        ALL
    }

    /// Parses a transport value into a capability.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|capability| capability.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown capability value '{value}'")))
    }
}

/// A labeled capability group used for presentation grouping only.
///
/// Grouping carries no authorization semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityGroup {
    /// User-facing group label.
    pub label: &'static str,
    /// Capabilities presented under the label.
    pub members: &'static [Capability],
}

/// Returns the presentation grouping of all capabilities.
#[must_use]
pub fn capability_groups() -> &'static [CapabilityGroup] {
    const GROUPS: &[CapabilityGroup] = &[
        CapabilityGroup {
            label: "Asset Management",
            members: &[
                Capability::AssetView,
                Capability::AssetCreate,
                Capability::AssetEdit,
                Capability::AssetDelete,
                Capability::AssetHandover,
                Capability::AssetLoan,
                Capability::AssetDismantle,
                Capability::AssetRepair,
                Capability::AssetRetire,
            ],
        },
        CapabilityGroup {
            label: "Request Workflow",
            members: &[
                Capability::RequestView,
                Capability::RequestCreate,
                Capability::RequestCancelOwn,
                Capability::RequestApproveLogistics,
                Capability::RequestApprovePurchasing,
                Capability::RequestApproveFinal,
            ],
        },
        CapabilityGroup {
            label: "Administration",
            members: &[
                Capability::UserView,
                Capability::UserManage,
                Capability::ReportView,
            ],
        },
    ];

    GROUPS
}
