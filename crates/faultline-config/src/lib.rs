#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
mod loader;
pub mod notification;
pub mod policy;
pub mod server;
pub mod service;
pub mod telemetry;

use serde::Deserialize;

pub use env::ExpandError;
pub use health::*;
pub use notification::*;
pub use policy::*;
pub use server::*;
pub use service::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level faultline configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Service identity
    #[serde(default)]
    pub service: ServiceConfig,
    /// Log level and notification rules
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Operator notification transport
    #[serde(default)]
    pub notification: Option<NotificationConfig>,
    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
