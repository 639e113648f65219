use super::*;

use assetflow_core::ItemId;
use assetflow_domain::PurchaseDetails;

impl RequestService {
    /// Records purchase details for items requiring a purchase.
    pub async fn update_purchase_details(
        &self,
        actor: &User,
        request_id: RequestId,
        details: Vec<(ItemId, PurchaseDetails)>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::UpdatePurchaseDetails { details },
            "purchase details recorded",
        )
        .await
    }

    /// Submits a request for final approval once the purchase form is complete.
    pub async fn submit_for_final_approval(
        &self,
        actor: &User,
        request_id: RequestId,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::SubmitForFinalApproval,
            "submitted for final approval",
        )
        .await
    }

    /// Starts procurement of an approved request.
    pub async fn start_procurement(
        &self,
        actor: &User,
        request_id: RequestId,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::StartProcurement,
            "procurement started",
        )
        .await
    }

    /// Marks the purchase as dispatched by the vendor.
    pub async fn mark_in_delivery(
        &self,
        actor: &User,
        request_id: RequestId,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::MarkInDelivery,
            "marked as in delivery",
        )
        .await
    }

    /// Marks the delivery as arrived at the warehouse.
    pub async fn mark_arrived(&self, actor: &User, request_id: RequestId) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::MarkArrived,
            "marked as arrived",
        )
        .await
    }
}
