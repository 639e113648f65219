use assetflow_core::{AppResult, RequestId};
use assetflow_domain::Request;
use async_trait::async_trait;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral informational message.
    Info,
    /// A submission was applied.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// A submission was rejected.
    Error,
}

impl Severity {
    /// Returns a stable label for this severity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Persistence port for request aggregates.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Finds a request by identifier.
    async fn find(&self, id: RequestId) -> AppResult<Option<Request>>;

    /// Saves the latest state of a request.
    async fn save(&self, request: Request) -> AppResult<()>;
}

/// Notification sink for user-facing toast messages.
///
/// Delivery is fire-and-forget from the engine's perspective; the sink
/// decides how and where a message surfaces.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Emits one notification.
    async fn notify(&self, severity: Severity, message: &str) -> AppResult<()>;
}
