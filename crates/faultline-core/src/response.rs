use std::ops::ControlFlow;
use std::sync::Arc;

use http::StatusCode;

use crate::policy::{ClassificationPolicy, SharedPolicy};
use crate::{CanonicalError, ErrorStage, RequestInfo, ResponseSink};

/// Log sink for classified errors
///
/// Methods return nothing: a logging outage must not stop the response
/// from being written.
pub trait ErrorLogger: Send + Sync {
    fn warn(&self, error: &CanonicalError);

    fn error(&self, error: &CanonicalError);
}

/// [`ErrorLogger`] backed by the global `tracing` dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn warn(&self, error: &CanonicalError) {
        tracing::warn!(
            status = error.status(),
            path = error.path().unwrap_or_default(),
            "{}",
            error.message()
        );
    }

    fn error(&self, error: &CanonicalError) {
        tracing::error!(
            status = error.status(),
            path = error.path().unwrap_or_default(),
            stack_trace = error.stack_trace().unwrap_or_default(),
            "{}",
            error.message()
        );
    }
}

/// Attaches the request path, logs by severity and writes the JSON response
#[derive(Clone)]
pub struct ResponseStage {
    policy: ClassificationPolicy,
    logger: Arc<dyn ErrorLogger>,
}

impl ResponseStage {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self {
            policy,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Replace the default `tracing` logger
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub const fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }
}

impl Default for ResponseStage {
    fn default() -> Self {
        Self::new(ClassificationPolicy::default())
    }
}

impl std::fmt::Debug for ResponseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStage").finish_non_exhaustive()
    }
}

impl ErrorStage for ResponseStage {
    fn handle(
        &self,
        mut error: CanonicalError,
        request: &RequestInfo,
        response: &mut dyn ResponseSink,
    ) -> ControlFlow<(), CanonicalError> {
        error.set_path(request.path.clone());

        if self.policy.should_warn(error.status()) {
            self.logger.warn(&error);
        }
        if self.policy.should_alarm(error.status()) {
            self.logger.error(&error);
        }

        let status = StatusCode::from_u16(error.status()).unwrap_or_else(|_| {
            tracing::warn!(status = error.status(), "not a valid HTTP status, responding with 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        match serde_json::to_value(&error) {
            Ok(body) => {
                response.set_status(status);
                response.send(body);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize error body");
                response.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                response.send(serde_json::Value::Null);
            }
        }

        ControlFlow::Continue(error)
    }
}

/// Build a response stage, falling back to the default rules for any
/// policy not supplied
pub fn response_stage(warn: Option<SharedPolicy>, alarm: Option<SharedPolicy>) -> ResponseStage {
    let defaults = ClassificationPolicy::default();
    ResponseStage::new(ClassificationPolicy::new(
        warn.unwrap_or(defaults.warn),
        alarm.unwrap_or(defaults.alarm),
    ))
}
