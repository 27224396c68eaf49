use async_trait::async_trait;
use serde::Serialize;

use crate::NotifyError;

/// Message handed to a notification transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Outbound channel for operator alerts (mail relay, chat webhook, ...)
///
/// Built once per process and shared across requests; each call carries
/// its own complete payload.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}
