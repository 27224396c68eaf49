use axum::extract::OriginalUri;
use faultline_core::{RequestInfo, not_found_stage};

use crate::Failure;

/// Fallback for requests that matched no route
///
/// Produces the 404 error and leaves writing the response to the chain.
pub async fn not_found_handler(OriginalUri(uri): OriginalUri) -> Failure {
    Failure::canonical(not_found_stage().handle(&RequestInfo::from(&uri)))
}
