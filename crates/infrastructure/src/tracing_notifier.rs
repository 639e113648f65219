//! Notification sink for development. Logs notifications to tracing output.

use assetflow_application::{Notifier, Severity};
use assetflow_core::AppResult;
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Development notification sink that logs messages instead of toasting them.
#[derive(Clone)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new tracing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, severity: Severity, message: &str) -> AppResult<()> {
        match severity {
            Severity::Info | Severity::Success => {
                info!(severity = severity.as_str(), "{message}");
            }
            Severity::Warning => {
                warn!(severity = severity.as_str(), "{message}");
            }
            Severity::Error => {
                error!(severity = severity.as_str(), "{message}");
            }
        }

        Ok(())
    }
}
