//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use faultline_config::{Config, NotificationConfig, ServerConfig};
use faultline_core::StatusSet;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Name the service in notification subjects
    pub fn with_service_name(mut self, name: &str) -> Self {
        self.config.service.name = name.to_owned();
        self
    }

    /// Send notifications to a mock mail relay
    pub fn with_mail_relay(mut self, endpoint: &str) -> Self {
        self.config.notification = Some(NotificationConfig {
            enabled: true,
            endpoint: endpoint.parse().expect("valid URL"),
            api_key: Some("relay-key".to_owned().into()),
            from: "alerts@example.com".to_owned(),
            recipients: vec!["oncall@example.com".to_owned()],
            timeout: "2s".to_owned(),
        });
        self
    }

    /// Replace the notification rule
    pub fn with_notify(mut self, set: StatusSet) -> Self {
        self.config.policy.notify = set;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
