use std::collections::BTreeMap;

use super::*;

use assetflow_core::ItemId;
use assetflow_domain::{HandoverLine, StagingLine};

impl RequestService {
    /// Registers staged assets against an arrived request. Repeatable until
    /// every line reaches its approved quantity.
    pub async fn register_assets(
        &self,
        actor: &User,
        request_id: RequestId,
        lines: Vec<StagingLine>,
        available_stock: BTreeMap<ItemId, u32>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::RegisterAssets {
                lines,
                available_stock,
            },
            "assets registered",
        )
        .await
    }

    /// Declares staging complete and moves the request to handover.
    pub async fn complete_staging(
        &self,
        actor: &User,
        request_id: RequestId,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::CompleteStaging,
            "staging completed",
        )
        .await
    }

    /// Records a partial or complete handover to the requester.
    pub async fn record_handover(
        &self,
        actor: &User,
        request_id: RequestId,
        lines: Vec<HandoverLine>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::RecordHandover { lines },
            "handover recorded",
        )
        .await
    }
}
