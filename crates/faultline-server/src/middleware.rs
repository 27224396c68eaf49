use std::sync::Arc;

use axum::Json;
use axum::body::to_bytes;
use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use faultline_core::{BufferedResponse, CanonicalError, Caught, ErrorPipeline, RequestInfo};
use http::{Method, StatusCode, header};

/// Largest rejection body kept as the error message
const REJECTION_BODY_LIMIT: usize = 64 * 1024;

/// Middleware that routes failed responses through the error chain
///
/// Handlers, the fallback and the panic hook report failures by leaving a
/// [`Caught`] value in the response extensions. Any other 4xx or 5xx
/// response, such as an extractor rejection or a 405 from the router, is
/// turned into a canonical error with the same status. Successful
/// responses pass through untouched.
pub async fn failure_middleware(State(pipeline): State<Arc<ErrorPipeline>>, request: Request, next: Next) -> Response {
    let info = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| RequestInfo::from(request.uri()), |original| RequestInfo::from(&original.0));
    let method = request.method().clone();

    let mut response = next.run(request).await;

    if let Some(caught) = response.extensions_mut().remove::<Caught>() {
        return respond(&pipeline, caught, &info);
    }

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let allow = response.headers().get(header::ALLOW).cloned();
        let caught = rejection(status, &method, &info, response).await;

        let mut response = respond(&pipeline, caught, &info);
        if let Some(allow) = allow {
            response.headers_mut().insert(header::ALLOW, allow);
        }
        return response;
    }

    response
}

/// Canonical error for a failure response produced outside the handler
///
/// The response body becomes the message; an empty or unreadable body
/// falls back to the method, URL and reason phrase.
async fn rejection(status: StatusCode, method: &Method, request: &RequestInfo, response: Response) -> Caught {
    let text = to_bytes(response.into_body(), REJECTION_BODY_LIMIT)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_owned())
        .filter(|text| !text.is_empty());

    let message = text.unwrap_or_else(|| {
        format!(
            "{method} {} failed: {}",
            request.url,
            status.canonical_reason().unwrap_or("error")
        )
    });

    Caught::Canonical(CanonicalError::new(status.as_u16(), message))
}

/// Run the chain and turn its output into an HTTP response
pub(crate) fn respond(pipeline: &ErrorPipeline, caught: Caught, request: &RequestInfo) -> Response {
    let mut sink = BufferedResponse::new();
    pipeline.run(caught, request, &mut sink);

    if let Some((status, body)) = sink.into_parts() {
        return (status, Json(body)).into_response();
    }

    tracing::error!(path = %request.path, "error chain finished without writing a response");

    let mut error = CanonicalError::new(
        StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        "error chain finished without writing a response",
    );
    error.set_path(request.path.clone());

    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}
