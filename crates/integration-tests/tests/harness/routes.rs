//! Application routes exercising each kind of handler failure

use axum::Router;
use axum::extract::Path;
use axum::routing::get;
use faultline_core::CanonicalError;
use faultline_server::Failure;
use axum::http::StatusCode;

async fn order(Path(id): Path<u32>) -> Result<String, Failure> {
    if id == 0 {
        return Err(Failure::status(StatusCode::NOT_FOUND, format!("order {id} does not exist")));
    }

    Ok(format!("order {id}"))
}

async fn database() -> Result<String, Failure> {
    let bytes = std::fs::read("/nonexistent/faultline/db.sqlite")?;
    Ok(format!("{} bytes", bytes.len()))
}

async fn maintenance() -> Result<String, Failure> {
    Err(Failure::canonical(CanonicalError::new(503, "down for maintenance")))
}

async fn legacy() -> Result<String, Failure> {
    Err(Failure::value(serde_json::json!({ "asdf": "asdf" })))
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

/// Routes used by the integration tests
pub fn app() -> Router {
    Router::new()
        .route("/orders/{id}", get(order))
        .route("/database", get(database))
        .route("/maintenance", get(maintenance))
        .route("/legacy", get(legacy))
        .route("/explode", get(explode))
}
