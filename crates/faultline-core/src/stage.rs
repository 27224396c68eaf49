use std::ops::ControlFlow;

use http::StatusCode;
use serde_json::Value;

use crate::caught::canonical_shape;
use crate::{CanonicalError, Caught, RequestInfo};

/// One step of the failure-handling chain after classification
///
/// Returning `Continue` hands the (possibly updated) error to the next
/// stage; `Break` ends the chain for this request.
pub trait ErrorStage: Send + Sync {
    fn handle(
        &self,
        error: CanonicalError,
        request: &RequestInfo,
        response: &mut dyn ResponseSink,
    ) -> ControlFlow<(), CanonicalError>;
}

/// Write-once destination for the error response
pub trait ResponseSink {
    fn set_status(&mut self, status: StatusCode);

    fn send(&mut self, body: Value);
}

/// In-memory [`ResponseSink`] that the host framework turns into a real response
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    body: Option<Value>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub const fn is_sent(&self) -> bool {
        self.body.is_some()
    }

    /// Status and body, if a body was sent
    pub fn into_parts(self) -> Option<(StatusCode, Value)> {
        let body = self.body?;
        Some((self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body))
    }
}

impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        if self.is_sent() {
            tracing::warn!(%status, "response already sent, ignoring status");
            return;
        }
        self.status = Some(status);
    }

    fn send(&mut self, body: Value) {
        if self.is_sent() {
            tracing::warn!("response already sent, ignoring body");
            return;
        }
        self.body = Some(body);
    }
}

/// Produces the error for requests that matched no route
///
/// Never writes a response itself; the error goes through the same chain
/// as every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundStage;

impl NotFoundStage {
    pub fn handle(&self, request: &RequestInfo) -> CanonicalError {
        CanonicalError::new(StatusCode::NOT_FOUND.as_u16(), format!("{} not found.", request.url))
    }
}

/// Entry point of the chain: turns any caught value into a [`CanonicalError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassificationStage;

impl ErrorClassificationStage {
    /// Classify a caught failure
    ///
    /// Canonical errors pass through untouched. Everything else becomes a
    /// 500: exception-like values keep their message and trace, other
    /// values are serialized to JSON as the message.
    pub fn classify(&self, caught: Caught) -> CanonicalError {
        let status = StatusCode::INTERNAL_SERVER_ERROR.as_u16();

        match caught {
            Caught::Canonical(error) => error,
            Caught::Exception {
                message,
                stack_trace: Some(trace),
            } => CanonicalError::with_stack_trace(status, message, trace),
            Caught::Exception {
                message,
                stack_trace: None,
            } => CanonicalError::new(status, message),
            Caught::Value(value) => canonical_shape(&value).unwrap_or_else(|| CanonicalError::new(status, value.to_string())),
        }
    }
}

/// Stage producing the 404 error for unmatched routes
pub const fn not_found_stage() -> NotFoundStage {
    NotFoundStage
}

/// Stage classifying caught failures
pub const fn error_classification_stage() -> ErrorClassificationStage {
    ErrorClassificationStage
}
