use serde::Serialize;

use crate::reason::reason_phrase;

/// Normalized representation of any failure that reaches the error chain
///
/// `error` is always derived from `status` and `timestamp` is fixed at
/// construction. `path` starts empty and is filled in once by the response
/// stage. `stack_trace` never leaves the process through the client-facing
/// body; only the notification channel sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalError {
    timestamp: String,
    status: u16,
    error: String,
    message: String,
    path: Option<String>,
    #[serde(skip)]
    stack_trace: Option<String>,
}

impl CanonicalError {
    /// Build an error without a stack trace
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self::build(status, message.into(), None)
    }

    /// Build an error that carries the trace of the originating failure
    pub fn with_stack_trace(status: u16, message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self::build(status, message.into(), Some(stack_trace.into()))
    }

    fn build(status: u16, message: String, stack_trace: Option<String>) -> Self {
        Self {
            timestamp: now_iso8601(),
            status,
            error: reason_phrase(status).to_owned(),
            message,
            path: None,
            stack_trace,
        }
    }

    /// Rebuild an error from its wire fields
    ///
    /// Returns `None` when `error` disagrees with the reason phrase for
    /// `status`, since such a value was not produced by this type.
    pub(crate) fn from_parts(
        timestamp: String,
        status: u16,
        error: String,
        message: String,
    ) -> Option<Self> {
        (error == reason_phrase(status)).then_some(Self {
            timestamp,
            status,
            error,
            message,
            path: None,
            stack_trace: None,
        })
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase for `status` (empty for unknown codes)
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// ISO-8601 creation time with millisecond precision
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Record the originating request path
    ///
    /// Called once per error by the response stage. Reusing an error for a
    /// second request replaces the earlier path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }
}

impl std::fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.error, self.message)
    }
}

fn now_iso8601() -> String {
    format!("{:.3}", jiff::Timestamp::now())
}
