use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Mail relay used to alert operators about server errors
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Relay endpoint receiving `{ from, subject, body, recipients }`
    pub endpoint: Url,
    /// Bearer token for the relay
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Sender address
    pub from: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Request timeout, e.g. `"10s"`
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_timeout() -> String {
    "10s".to_string()
}
