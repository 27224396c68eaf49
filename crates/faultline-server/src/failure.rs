use axum::response::{IntoResponse, Response};
use faultline_core::{CanonicalError, Caught};
use http::StatusCode;
use serde_json::Value;

/// Error type for handlers behind the failure middleware
///
/// Any error convertible into `anyhow::Error` becomes an exception-like
/// failure via `?`. Rendering only produces a placeholder carrying the
/// caught value; the failure middleware replaces it with the real
/// response, so handlers must run inside [`crate::install`].
#[derive(Debug)]
pub struct Failure(Caught);

impl Failure {
    /// Fail with an error that is already canonical
    pub const fn canonical(error: CanonicalError) -> Self {
        Self(Caught::Canonical(error))
    }

    /// Fail with a specific status and message
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::canonical(CanonicalError::new(status.as_u16(), message))
    }

    /// Fail with an arbitrary JSON value
    pub fn value(value: Value) -> Self {
        Self(Caught::from_value(value))
    }

    /// Fail from a caught panic payload
    pub fn panic(payload: &(dyn std::any::Any + Send)) -> Self {
        Self(Caught::from_panic(payload))
    }

    pub fn into_caught(self) -> Caught {
        self.0
    }
}

impl<E> From<E> for Failure
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        Self(Caught::from(error.into()))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}
