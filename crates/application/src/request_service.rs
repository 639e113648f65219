use std::sync::Arc;

use assetflow_core::{AppError, AppResult, RequestId};
use assetflow_domain::{
    Capability, CapabilityGraph, CatalogIndex, Request, RequestAction, RequestInput, RequestItem,
    RequestStatus, User,
};
use chrono::Utc;

use crate::request_ports::{Notifier, RequestRepository, Severity};

mod approvals;
mod fulfillment;
mod procurement;

/// Application service driving the request lifecycle.
///
/// Every mutation loads the aggregate, checks the capability gate, applies
/// the pure transition, persists the result, and notifies the caller-facing
/// sink. Validation failures leave the stored aggregate unchanged.
#[derive(Clone)]
pub struct RequestService {
    graph: Arc<CapabilityGraph>,
    catalog: Arc<CatalogIndex>,
    repository: Arc<dyn RequestRepository>,
    notifier: Arc<dyn Notifier>,
}

impl RequestService {
    /// Creates a request service over its collaborator ports.
    #[must_use]
    pub fn new(
        graph: Arc<CapabilityGraph>,
        catalog: Arc<CatalogIndex>,
        repository: Arc<dyn RequestRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            graph,
            catalog,
            repository,
            notifier,
        }
    }

    /// Returns the capability graph used for gate checks.
    #[must_use]
    pub fn graph(&self) -> &CapabilityGraph {
        &self.graph
    }

    /// Returns whether an actor may invoke an action at a status.
    ///
    /// UI callers check this before offering an action; the mutation paths
    /// re-check it regardless.
    #[must_use]
    pub fn can(&self, actor: &User, action: &RequestAction, status: RequestStatus) -> bool {
        action.is_permitted(&self.graph, actor, status)
    }

    /// Submits a new request on behalf of the acting user.
    pub async fn submit_request(
        &self,
        actor: &User,
        items: Vec<RequestItem>,
    ) -> AppResult<Request> {
        if !self.graph.has_permission(actor, Capability::RequestCreate) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is missing capability '{}'",
                actor.subject(),
                Capability::RequestCreate.as_str()
            )));
        }

        let request = Request::submit(RequestInput {
            id: RequestId::new(),
            requester: actor.subject().to_owned(),
            items,
            submitted_at: Utc::now(),
        })?;

        self.repository.save(request.clone()).await?;
        self.notifier
            .notify(Severity::Success, "request submitted")
            .await?;
        Ok(request)
    }

    /// Cancels a request on behalf of its requester.
    pub async fn cancel_request(
        &self,
        actor: &User,
        request_id: RequestId,
        reason: Option<String>,
    ) -> AppResult<Request> {
        self.execute(
            actor,
            request_id,
            RequestAction::Cancel { reason },
            "request cancelled",
        )
        .await
    }

    /// Appends a comment to a request's activity log.
    pub async fn add_comment(
        &self,
        actor: &User,
        request_id: RequestId,
        text: impl Into<String> + Send,
    ) -> AppResult<Request> {
        if !self.graph.has_permission(actor, Capability::RequestView) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is missing capability '{}'",
                actor.subject(),
                Capability::RequestView.as_str()
            )));
        }

        let mut request = self.load(request_id).await?;
        request.add_comment(actor.subject(), text, Utc::now())?;
        self.repository.save(request.clone()).await?;
        Ok(request)
    }

    async fn load(&self, request_id: RequestId) -> AppResult<Request> {
        self.repository
            .find(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("request '{request_id}' does not exist")))
    }

    async fn execute(
        &self,
        actor: &User,
        request_id: RequestId,
        action: RequestAction,
        success: &str,
    ) -> AppResult<Request> {
        let request = self.load(request_id).await?;

        if !action.is_permitted(&self.graph, actor, request.status()) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is not allowed to perform this action on request '{request_id}'",
                actor.subject()
            )));
        }

        match request.apply(&action, actor, &self.catalog, Utc::now()) {
            Ok(next) => {
                self.repository.save(next.clone()).await?;
                self.notifier.notify(Severity::Success, success).await?;

                if next.status() == RequestStatus::Completed {
                    self.notifier
                        .notify(Severity::Info, "request completed")
                        .await?;
                }

                Ok(next)
            }
            Err(error) => {
                if matches!(error, AppError::Validation(_)) {
                    self.notifier
                        .notify(Severity::Error, &error.to_string())
                        .await?;
                }

                Err(error)
            }
        }
    }
}
