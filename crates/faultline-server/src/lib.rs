#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod failure;
mod health;
mod middleware;
mod not_found;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::response::IntoResponse;
use faultline_config::Config;
use faultline_core::{ErrorPipeline, response_stage};
use faultline_notify::notification_stage;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use failure::Failure;
pub use middleware::failure_middleware;
pub use not_found::not_found_handler;

/// Build the error chain described by the configuration
///
/// The response stage always runs; the notification stage is appended when
/// a `[notification]` section is present and enabled.
///
/// # Errors
///
/// Returns an error if the notification transport cannot be built
pub fn build_pipeline(config: &Config) -> anyhow::Result<ErrorPipeline> {
    let policy = &config.policy;

    let mut pipeline = ErrorPipeline::new().stage(response_stage(
        Some(Arc::new(policy.warn.clone())),
        Some(Arc::new(policy.alarm.clone())),
    ));

    if let Some(ref notification) = config.notification
        && notification.enabled
    {
        let stage = notification_stage(
            config.service.name.clone(),
            notification,
            Some(Arc::new(policy.notify.clone())),
        )?;

        tracing::info!(
            endpoint = %notification.endpoint,
            recipients = notification.recipients.len(),
            "error notifications enabled"
        );

        pipeline = pipeline.stage(stage);
    }

    tracing::debug!(stages = pipeline.len(), "error chain ready");

    Ok(pipeline)
}

/// Wrap a router with the failure-handling chain
///
/// Unmatched requests get the not-found error, handler failures and
/// panics are classified, and every failure is answered by the chain.
pub fn install(router: Router, pipeline: ErrorPipeline) -> Router {
    router
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(|payload: Box<dyn std::any::Any + Send + 'static>| {
            Failure::panic(payload.as_ref()).into_response()
        }))
        .layer(axum::middleware::from_fn_with_state(Arc::new(pipeline), failure_middleware))
}

/// Assembled server with application routes and the error layer
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration and application routes
    ///
    /// # Errors
    ///
    /// Returns an error if the error chain cannot be built
    pub fn new(config: &Config, routes: Router) -> anyhow::Result<Self> {
        let pipeline = build_pipeline(config)?;
        Ok(Self::with_pipeline(config, routes, pipeline))
    }

    /// Build the server around a caller-assembled error chain
    pub fn with_pipeline(config: &Config, routes: Router, pipeline: ErrorPipeline) -> Self {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let mut app = routes;

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = install(app, pipeline).layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address,
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
