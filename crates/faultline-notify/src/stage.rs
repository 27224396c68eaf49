use std::ops::ControlFlow;
use std::sync::Arc;

use faultline_config::NotificationConfig;
use faultline_core::{CanonicalError, ErrorStage, RequestInfo, ResponseSink, SharedPolicy, policy};
use tokio::task::JoinHandle;

use crate::{HttpMailTransport, Notification, NotificationTransport, NotifyError};

/// Forwards high-severity errors to operators without holding up the request
///
/// Runs after the response stage. Dispatch is spawned onto the current
/// tokio runtime and never awaited; transport failures are logged and
/// dropped.
#[derive(Clone)]
pub struct NotificationStage {
    service_name: String,
    recipients: Vec<String>,
    transport: Arc<dyn NotificationTransport>,
    policy: SharedPolicy,
}

impl NotificationStage {
    pub fn new(
        service_name: impl Into<String>,
        recipients: Vec<String>,
        transport: Arc<dyn NotificationTransport>,
        policy: SharedPolicy,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            recipients,
            transport,
            policy,
        }
    }

    pub fn should_send(&self, status: u16) -> bool {
        self.policy.applies(status)
    }

    /// Assemble the alert for an error
    ///
    /// The body holds the client-facing fields as JSON, followed by the
    /// stack trace in its own section.
    pub fn notification(&self, error: &CanonicalError) -> Notification {
        let details = serde_json::to_string_pretty(error).unwrap_or_else(|_| error.to_string());
        let trace = error.stack_trace().unwrap_or("(none)");

        Notification {
            subject: format!(
                "[{}] {} {}: {}",
                self.service_name,
                error.status(),
                error.error(),
                error.message()
            ),
            body: format!("{details}\n\nStack trace:\n{trace}"),
            recipients: self.recipients.clone(),
        }
    }

    /// Spawn delivery of the alert for `error`
    ///
    /// Returns the task handle, or `None` when no tokio runtime is
    /// available to run it.
    pub fn dispatch(&self, error: &CanonicalError) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!(
                service = %self.service_name,
                status = error.status(),
                "no async runtime available, dropping error notification"
            );
            return None;
        };

        let notification = self.notification(error);
        let transport = Arc::clone(&self.transport);
        let service = self.service_name.clone();
        let status = error.status();

        Some(runtime.spawn(async move {
            if let Err(e) = transport.send(notification).await {
                tracing::error!(error = %e, %service, status, "failed to send error notification");
            }
        }))
    }
}

impl ErrorStage for NotificationStage {
    fn handle(
        &self,
        error: CanonicalError,
        _request: &RequestInfo,
        _response: &mut dyn ResponseSink,
    ) -> ControlFlow<(), CanonicalError> {
        if self.should_send(error.status()) {
            // Fire and forget: the response is already written
            drop(self.dispatch(&error));
        }

        ControlFlow::Continue(error)
    }
}

impl std::fmt::Debug for NotificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStage")
            .field("service_name", &self.service_name)
            .field("recipients", &self.recipients)
            .finish_non_exhaustive()
    }
}

/// Build a notification stage backed by the HTTP mail transport
///
/// Uses the default server-error rule when no `send_policy` is given.
///
/// # Errors
///
/// Returns an error if the transport cannot be built from `transport_config`
pub fn notification_stage(
    service_name: impl Into<String>,
    transport_config: &NotificationConfig,
    send_policy: Option<SharedPolicy>,
) -> Result<NotificationStage, NotifyError> {
    let transport = HttpMailTransport::from_config(transport_config)?;

    Ok(NotificationStage::new(
        service_name,
        transport_config.recipients.clone(),
        Arc::new(transport),
        send_policy.unwrap_or_else(|| Arc::new(policy::should_notify)),
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use faultline_core::BufferedResponse;
    use tokio::sync::mpsc;

    use super::*;

    struct ChannelTransport {
        tx: mpsc::UnboundedSender<Notification>,
    }

    #[async_trait]
    impl NotificationTransport for ChannelTransport {
        async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
            self.tx.send(notification).ok();
            Ok(())
        }
    }

    /// Holds every send until the gate opens
    struct GatedTransport {
        gate: Arc<tokio::sync::Notify>,
        tx: mpsc::UnboundedSender<Notification>,
    }

    #[async_trait]
    impl NotificationTransport for GatedTransport {
        async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
            self.gate.notified().await;
            self.tx.send(notification).ok();
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl NotificationTransport for FailingTransport {
        async fn send(&self, _notification: Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Api {
                status: 502,
                body: "relay down".to_owned(),
            })
        }
    }

    fn stage_with(transport: Arc<dyn NotificationTransport>) -> NotificationStage {
        NotificationStage::new(
            "orders",
            vec!["oncall@example.com".to_owned()],
            transport,
            Arc::new(policy::should_notify),
        )
    }

    fn db_down() -> CanonicalError {
        let mut error = CanonicalError::with_stack_trace(500, "db down", "Error: db down\n    at query()");
        error.set_path("/orders");
        error
    }

    #[test]
    fn payload_separates_trace_from_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stage = stage_with(Arc::new(ChannelTransport { tx }));

        let notification = stage.notification(&db_down());

        assert_eq!(notification.subject, "[orders] 500 Internal Server Error: db down");
        assert_eq!(notification.recipients, ["oncall@example.com"]);

        let (details, trace) = notification.body.split_once("\n\nStack trace:\n").unwrap();
        let details: serde_json::Value = serde_json::from_str(details).unwrap();
        assert_eq!(details["message"], "db down");
        assert_eq!(details["path"], "/orders");
        assert!(details.get("stackTrace").is_none());
        assert_eq!(trace, "Error: db down\n    at query()");
    }

    #[test]
    fn payload_without_trace() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stage = stage_with(Arc::new(ChannelTransport { tx }));

        let notification = stage.notification(&CanonicalError::new(503, "maintenance"));
        assert!(notification.body.ends_with("Stack trace:\n(none)"));
    }

    #[tokio::test]
    async fn server_errors_are_dispatched() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stage = stage_with(Arc::new(ChannelTransport { tx }));

        let mut response = BufferedResponse::new();
        let flow = stage.handle(db_down(), &RequestInfo::new("/orders", "/orders"), &mut response);
        assert!(matches!(flow, ControlFlow::Continue(ref e) if e.status() == 500));

        let sent = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(sent.subject.contains("db down"));
        assert!(sent.body.contains("at query()"));
    }

    #[tokio::test]
    async fn client_errors_are_not_dispatched() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stage = stage_with(Arc::new(ChannelTransport { tx }));

        let mut response = BufferedResponse::new();
        let flow = stage.handle(
            CanonicalError::new(404, "/missing not found."),
            &RequestInfo::new("/missing", "/missing"),
            &mut response,
        );
        assert!(matches!(flow, ControlFlow::Continue(_)));

        drop(stage);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn custom_send_policy() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stage = NotificationStage::new(
            "orders",
            Vec::new(),
            Arc::new(ChannelTransport { tx }),
            Arc::new(|status: u16| status == 429),
        );

        assert!(stage.should_send(429));
        assert!(!stage.should_send(500));

        stage.dispatch(&CanonicalError::new(429, "slow down")).unwrap().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().subject, "[orders] 429 Too Many Requests: slow down");
    }

    #[tokio::test]
    async fn handle_returns_before_delivery() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stage = stage_with(Arc::new(GatedTransport {
            gate: Arc::clone(&gate),
            tx,
        }));

        let mut response = BufferedResponse::new();
        let flow = stage.handle(db_down(), &RequestInfo::new("/orders", "/orders"), &mut response);
        assert!(matches!(flow, ControlFlow::Continue(_)));
        assert!(rx.try_recv().is_err());

        gate.notify_one();
        let sent = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(sent.subject.contains("db down"));
    }

    #[tokio::test]
    async fn transport_failure_is_contained() {
        let stage = stage_with(Arc::new(FailingTransport));

        let handle = stage.dispatch(&db_down()).unwrap();
        assert!(handle.await.is_ok());

        let mut response = BufferedResponse::new();
        let flow = stage.handle(db_down(), &RequestInfo::new("/orders", "/orders"), &mut response);
        assert!(matches!(flow, ControlFlow::Continue(_)));
    }

    #[test]
    fn dispatch_without_runtime_is_dropped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let stage = stage_with(Arc::new(ChannelTransport { tx }));

        assert!(stage.dispatch(&db_down()).is_none());
    }

    #[tokio::test]
    async fn factory_uses_config() {
        let config: NotificationConfig = toml::from_str(
            r#"
            endpoint = "http://localhost:9/send"
            from = "alerts@example.com"
            recipients = ["a@example.com", "b@example.com"]
            "#,
        )
        .unwrap();

        let stage = notification_stage("billing", &config, None).unwrap();

        assert!(stage.should_send(500));
        assert!(!stage.should_send(404));
        assert_eq!(
            stage.notification(&CanonicalError::new(500, "x")).recipients,
            ["a@example.com", "b@example.com"]
        );
    }
}
