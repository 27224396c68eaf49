use serde::Deserialize;
use serde_json::Value;

use crate::CanonicalError;

/// A failure as it was caught, before classification
#[derive(Debug, Clone, PartialEq)]
pub enum Caught {
    /// Already canonical, forwarded unchanged
    Canonical(CanonicalError),
    /// Exception-like failure carrying a message and possibly a trace
    Exception {
        message: String,
        stack_trace: Option<String>,
    },
    /// Any other rejected value
    Value(Value),
}

impl Caught {
    pub fn exception(message: impl Into<String>, stack_trace: Option<String>) -> Self {
        Self::Exception {
            message: message.into(),
            stack_trace,
        }
    }

    /// Wrap an arbitrary JSON value
    ///
    /// A value with exactly the wire shape of a [`CanonicalError`] is
    /// recognized as canonical.
    pub fn from_value(value: Value) -> Self {
        match canonical_shape(&value) {
            Some(canonical) => Self::Canonical(canonical),
            None => Self::Value(value),
        }
    }

    /// Wrap a panic payload from a caught unwind
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()))
            .unwrap_or_else(|| "handler panicked".to_owned());

        Self::exception(message, None)
    }
}

impl From<anyhow::Error> for Caught {
    fn from(error: anyhow::Error) -> Self {
        Self::exception(error.to_string(), Some(format!("{error:?}")))
    }
}

impl From<CanonicalError> for Caught {
    fn from(error: CanonicalError) -> Self {
        Self::Canonical(error)
    }
}

/// Parse a value that has exactly the client-facing shape of a [`CanonicalError`]
pub(crate) fn canonical_shape(value: &Value) -> Option<CanonicalError> {
    WireError::deserialize(value).ok().and_then(WireError::into_canonical)
}

/// Client-facing body of a [`CanonicalError`]
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireError {
    timestamp: String,
    status: u16,
    error: String,
    message: String,
    /// Belongs to the request that produced the body, not the current one
    #[serde(default, rename = "path")]
    _path: Option<serde::de::IgnoredAny>,
}

impl WireError {
    fn into_canonical(self) -> Option<CanonicalError> {
        CanonicalError::from_parts(self.timestamp, self.status, self.error, self.message)
    }
}
