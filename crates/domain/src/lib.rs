//! Domain entities and invariants for the asset request engine.

#![forbid(unsafe_code)]

mod capability;
mod catalog;
mod lifecycle;
mod permission_graph;
mod request;
mod review;
mod role;
mod staging;
mod user;

pub use capability::{Capability, CapabilityGroup, capability_groups};
pub use catalog::{CatalogEntry, CatalogIndex, ItemTracking};
pub use lifecycle::RequestAction;
pub use permission_graph::CapabilityGraph;
pub use request::{
    Activity, ActivityKind, DecisionStatus, ItemDecision, PurchaseDetails, PurchaseDetailsInput,
    Request, RequestInput, RequestItem, RequestStatus,
};
pub use review::{ReviewLine, ReviewStage, review_ceiling};
pub use role::{Role, RoleGrants, RolePolicy};
pub use staging::{HandoverLine, StagingLine};
pub use user::User;
