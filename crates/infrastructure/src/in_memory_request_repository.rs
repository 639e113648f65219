use std::collections::HashMap;

use assetflow_application::RequestRepository;
use assetflow_core::{AppResult, RequestId};
use assetflow_domain::Request;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory request repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryRequestRepository {
    requests: RwLock<HashMap<RequestId, Request>>,
}

impl InMemoryRequestRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
        }
    }

    /// Returns all stored requests, newest submission first.
    pub async fn list(&self) -> Vec<Request> {
        let requests = self.requests.read().await;

        let mut values: Vec<Request> = requests.values().cloned().collect();
        values.sort_by_key(|request| std::cmp::Reverse(request.submitted_at()));
        values
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn find(&self, id: RequestId) -> AppResult<Option<Request>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn save(&self, request: Request) -> AppResult<()> {
        self.requests.write().await.insert(request.id(), request);
        Ok(())
    }
}
