use super::*;

use assetflow_domain::ReviewLine;

impl RequestService {
    /// Approves the logistics stage, optionally revising item quantities.
    pub async fn approve_logistics(
        &self,
        actor: &User,
        request_id: RequestId,
        lines: Vec<ReviewLine>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::ApproveLogistics { lines },
            "logistics stage approved",
        )
        .await
    }

    /// Revises item decisions without approving a stage.
    pub async fn revise_items(
        &self,
        actor: &User,
        request_id: RequestId,
        lines: Vec<ReviewLine>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::ReviseItems { lines },
            "item decisions revised",
        )
        .await
    }

    /// Flags a request as prioritized without changing its status.
    pub async fn prioritize(&self, actor: &User, request_id: RequestId) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::Prioritize,
            "request prioritized",
        )
        .await
    }

    /// Approves the final stage, optionally revising item quantities.
    pub async fn approve_final(
        &self,
        actor: &User,
        request_id: RequestId,
        lines: Vec<ReviewLine>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::ApproveFinal { lines },
            "final stage approved",
        )
        .await
    }
}
