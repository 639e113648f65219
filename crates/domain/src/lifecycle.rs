use std::collections::BTreeMap;

use assetflow_core::{AppError, AppResult, ItemId};
use chrono::{DateTime, Utc};

use crate::capability::Capability;
use crate::catalog::CatalogIndex;
use crate::permission_graph::CapabilityGraph;
use crate::request::{Activity, ActivityKind, ItemDecision, PurchaseDetails, Request, RequestStatus};
use crate::review::{ReviewLine, ReviewStage, apply_review};
use crate::staging::{HandoverLine, StagingLine, apply_handover, apply_staging};
use crate::user::User;

/// A proposed transition of the request aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAction {
    /// Approves the logistics stage, optionally revising item quantities.
    ApproveLogistics {
        /// Per-item revisions; untouched items approve at their full quantity.
        lines: Vec<ReviewLine>,
    },
    /// Revises item decisions without approving a stage.
    ReviseItems {
        /// Per-item revisions.
        lines: Vec<ReviewLine>,
    },
    /// Cancels the request. Requester only.
    Cancel {
        /// Optional cancellation note.
        reason: Option<String>,
    },
    /// Records purchase details for items requiring a purchase.
    UpdatePurchaseDetails {
        /// Details per item.
        details: Vec<(ItemId, PurchaseDetails)>,
    },
    /// Submits the request for final approval.
    SubmitForFinalApproval,
    /// Flags the request as prioritized without a status change.
    Prioritize,
    /// Approves the final stage, optionally revising item quantities.
    ApproveFinal {
        /// Per-item revisions; untouched items carry forward at their ceiling.
        lines: Vec<ReviewLine>,
    },
    /// Starts procurement of the approved items.
    StartProcurement,
    /// Marks the purchase as dispatched by the vendor.
    MarkInDelivery,
    /// Marks the delivery as arrived at the warehouse.
    MarkArrived,
    /// Registers staged assets against arrived items. Repeatable.
    RegisterAssets {
        /// Staging batch lines.
        lines: Vec<StagingLine>,
        /// Bulk stock counts observed by the caller, per item.
        available_stock: BTreeMap<ItemId, u32>,
    },
    /// Declares staging complete once every line is covered.
    CompleteStaging,
    /// Records a partial or complete handover to the requester. Repeatable.
    RecordHandover {
        /// Handed-over units per item.
        lines: Vec<HandoverLine>,
    },
}

impl RequestAction {
    /// Returns the capabilities permitting this action at a status.
    ///
    /// Holding any one of the returned capabilities is sufficient.
    #[must_use]
    pub fn required_capabilities(&self, status: RequestStatus) -> &'static [Capability] {
        match self {
            Self::ApproveLogistics { .. } => &[Capability::RequestApproveLogistics],
            Self::ReviseItems { .. } => match status {
                RequestStatus::Pending => &[
                    Capability::RequestApproveLogistics,
                    Capability::RequestApproveFinal,
                ],
                _ => &[Capability::RequestApproveFinal],
            },
            Self::Cancel { .. } => &[Capability::RequestCancelOwn],
            Self::UpdatePurchaseDetails { .. }
            | Self::SubmitForFinalApproval
            | Self::StartProcurement
            | Self::MarkInDelivery => &[Capability::RequestApprovePurchasing],
            Self::Prioritize | Self::ApproveFinal { .. } => &[Capability::RequestApproveFinal],
            Self::MarkArrived => &[
                Capability::RequestApprovePurchasing,
                Capability::RequestApproveLogistics,
            ],
            Self::RegisterAssets { .. } | Self::CompleteStaging => {
                &[Capability::AssetCreate, Capability::RequestApproveFinal]
            }
            Self::RecordHandover { .. } => {
                &[Capability::AssetHandover, Capability::RequestApproveFinal]
            }
        }
    }

    /// Returns whether a user may invoke this action at a status.
    #[must_use]
    pub fn is_permitted(
        &self,
        graph: &CapabilityGraph,
        user: &User,
        status: RequestStatus,
    ) -> bool {
        self.required_capabilities(status)
            .iter()
            .any(|capability| graph.has_permission(user, *capability))
    }
}

impl Request {
    /// Applies a transition and returns the resulting aggregate.
    ///
    /// Authorization is expected to be checked up front via
    /// [`RequestAction::is_permitted`]; the reducer itself only enforces
    /// requester identity for cancellation. The receiver is left unchanged
    /// when the transition fails.
    pub fn apply(
        &self,
        action: &RequestAction,
        actor: &User,
        catalog: &CatalogIndex,
        at: DateTime<Utc>,
    ) -> AppResult<Request> {
        if self.is_terminal() {
            return Err(AppError::Conflict(format!(
                "request '{}' is {} and can no longer change",
                self.id(),
                self.status().as_str()
            )));
        }

        match action {
            RequestAction::ApproveLogistics { lines } => {
                self.expect_status(RequestStatus::Pending)?;
                let decisions = apply_review(self, ReviewStage::Logistics, lines, true)?;
                self.conclude_review(decisions, actor, at, ActivityKind::LogisticsApproved)
            }
            RequestAction::ReviseItems { lines } => {
                let stage = match self.status() {
                    RequestStatus::Pending => ReviewStage::Logistics,
                    RequestStatus::AwaitingFinalApproval => ReviewStage::Final,
                    _ => {
                        return Err(self.status_conflict("revise items"));
                    }
                };

                let decisions = apply_review(self, stage, lines, false)?;
                self.conclude_review(decisions, actor, at, ActivityKind::ItemsReviewed)
            }
            RequestAction::Cancel { reason } => {
                if actor.subject() != self.requester() {
                    return Err(AppError::Forbidden(format!(
                        "only the requester may cancel request '{}'",
                        self.id()
                    )));
                }

                if !matches!(
                    self.status(),
                    RequestStatus::Pending
                        | RequestStatus::LogisticsApproved
                        | RequestStatus::AwaitingFinalApproval
                ) {
                    return Err(self.status_conflict("cancel"));
                }

                let detail = reason
                    .as_deref()
                    .map_or_else(|| "cancelled by requester".to_owned(), str::to_owned);
                self.transitioned(RequestStatus::Cancelled, actor, at, ActivityKind::Cancelled, detail)
            }
            RequestAction::UpdatePurchaseDetails { details } => {
                self.expect_status(RequestStatus::LogisticsApproved)?;

                let mut next = self.clone();
                for (item_id, purchase) in details {
                    let Some(item) = self.item(*item_id) else {
                        return Err(AppError::Validation(format!(
                            "purchase details reference unknown item '{item_id}'"
                        )));
                    };

                    if !self.requires_purchase(*item_id) {
                        return Err(AppError::Validation(format!(
                            "item '{}' does not require a purchase",
                            item.name()
                        )));
                    }

                    next.set_purchase_details(*item_id, purchase.clone());
                }

                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    ActivityKind::PurchaseDetailsUpdated,
                    format!("recorded purchase details for {} item(s)", details.len()),
                )?);
                Ok(next)
            }
            RequestAction::SubmitForFinalApproval => {
                self.expect_status(RequestStatus::LogisticsApproved)?;
                if !self.purchase_form_valid() {
                    return Err(AppError::Validation(
                        "purchase details are incomplete for items requiring purchase".to_owned(),
                    ));
                }

                self.transitioned(
                    RequestStatus::AwaitingFinalApproval,
                    actor,
                    at,
                    ActivityKind::FinalApprovalRequested,
                    "submitted for final approval".to_owned(),
                )
            }
            RequestAction::Prioritize => {
                self.expect_status(RequestStatus::LogisticsApproved)?;
                if self.is_prioritized() {
                    return Err(AppError::Conflict(format!(
                        "request '{}' is already prioritized",
                        self.id()
                    )));
                }

                let mut next = self.clone();
                next.mark_prioritized();
                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    ActivityKind::Prioritized,
                    "flagged as prioritized".to_owned(),
                )?);
                Ok(next)
            }
            RequestAction::ApproveFinal { lines } => {
                self.expect_status(RequestStatus::AwaitingFinalApproval)?;
                let decisions = apply_review(self, ReviewStage::Final, lines, true)?;
                self.conclude_review(decisions, actor, at, ActivityKind::FinalApproved)
            }
            RequestAction::StartProcurement => {
                self.expect_status(RequestStatus::Approved)?;
                self.transitioned(
                    RequestStatus::Purchasing,
                    actor,
                    at,
                    ActivityKind::ProcurementStarted,
                    "procurement started".to_owned(),
                )
            }
            RequestAction::MarkInDelivery => {
                self.expect_status(RequestStatus::Purchasing)?;
                self.transitioned(
                    RequestStatus::InDelivery,
                    actor,
                    at,
                    ActivityKind::MarkedInDelivery,
                    "vendor dispatched the purchase".to_owned(),
                )
            }
            RequestAction::MarkArrived => {
                self.expect_status(RequestStatus::InDelivery)?;
                self.transitioned(
                    RequestStatus::Arrived,
                    actor,
                    at,
                    ActivityKind::MarkedArrived,
                    "delivery arrived at the warehouse".to_owned(),
                )
            }
            RequestAction::RegisterAssets {
                lines,
                available_stock,
            } => {
                self.expect_status(RequestStatus::Arrived)?;
                let increments = apply_staging(self, catalog, available_stock, lines)?;

                let mut next = self.clone();
                let total: u32 = increments.values().sum();
                for (item_id, count) in increments {
                    next.add_registered(item_id, count);
                }
                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    ActivityKind::AssetsRegistered,
                    format!("registered {total} asset unit(s)"),
                )?);
                Ok(next)
            }
            RequestAction::CompleteStaging => {
                self.expect_status(RequestStatus::Arrived)?;
                if !self.staging_complete() {
                    return Err(AppError::Validation(
                        "staging is not complete for every item".to_owned(),
                    ));
                }

                self.transitioned(
                    RequestStatus::AwaitingHandover,
                    actor,
                    at,
                    ActivityKind::StagingCompleted,
                    "staging completed".to_owned(),
                )
            }
            RequestAction::RecordHandover { lines } => {
                self.expect_status(RequestStatus::AwaitingHandover)?;
                let increments = apply_handover(self, lines)?;

                let mut next = self.clone();
                let total: u32 = increments.values().sum();
                for (item_id, count) in increments {
                    next.add_handed_over(item_id, count);
                }
                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    ActivityKind::HandoverRecorded,
                    format!("handed over {total} unit(s)"),
                )?);

                if next.handover_complete() {
                    next.set_status(RequestStatus::Completed);
                    next.record_activity(Activity::new(
                        actor.subject(),
                        at,
                        ActivityKind::Completed,
                        "all items handed over".to_owned(),
                    )?);
                }

                Ok(next)
            }
        }
    }

    fn expect_status(&self, expected: RequestStatus) -> AppResult<()> {
        if self.status() == expected {
            return Ok(());
        }

        Err(AppError::Conflict(format!(
            "request '{}' is {}, expected {}",
            self.id(),
            self.status().as_str(),
            expected.as_str()
        )))
    }

    fn status_conflict(&self, action: &str) -> AppError {
        AppError::Conflict(format!(
            "cannot {action} request '{}' while it is {}",
            self.id(),
            self.status().as_str()
        ))
    }

    fn transitioned(
        &self,
        status: RequestStatus,
        actor: &User,
        at: DateTime<Utc>,
        kind: ActivityKind,
        detail: String,
    ) -> AppResult<Request> {
        let mut next = self.clone();
        next.set_status(status);
        next.record_activity(Activity::new(actor.subject(), at, kind, detail)?);
        Ok(next)
    }

    fn conclude_review(
        &self,
        decisions: BTreeMap<ItemId, ItemDecision>,
        actor: &User,
        at: DateTime<Utc>,
        kind: ActivityKind,
    ) -> AppResult<Request> {
        let mut next = self.clone();
        for (item_id, decision) in decisions {
            next.set_decision(item_id, decision);
        }

        let all_rejected = next
            .items()
            .iter()
            .all(|item| next.effective_quantity(item.id()) == 0);
        if all_rejected {
            next.set_status(RequestStatus::Rejected);
            next.record_activity(Activity::new(
                actor.subject(),
                at,
                ActivityKind::Rejected,
                "every item was rejected".to_owned(),
            )?);
            return Ok(next);
        }

        match kind {
            ActivityKind::LogisticsApproved => {
                next.set_status(RequestStatus::LogisticsApproved);
                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    kind,
                    "logistics stage approved".to_owned(),
                )?);
            }
            ActivityKind::FinalApproved => {
                if !next.purchase_form_valid() {
                    return Err(AppError::Validation(
                        "purchase details are incomplete for items requiring purchase".to_owned(),
                    ));
                }

                next.set_status(RequestStatus::Approved);
                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    kind,
                    "final stage approved".to_owned(),
                )?);
            }
            _ => {
                if self.status() == RequestStatus::AwaitingFinalApproval {
                    next.set_status(RequestStatus::LogisticsApproved);
                }
                next.record_activity(Activity::new(
                    actor.subject(),
                    at,
                    kind,
                    "item decisions revised".to_owned(),
                )?);
            }
        }

        Ok(next)
    }
}
