use faultline_core::StatusSet;
use serde::Deserialize;

/// Status code sets driving log level and notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Statuses logged at warn level
    #[serde(default = "StatusSet::client_errors")]
    pub warn: StatusSet,
    /// Statuses logged at error level
    #[serde(default = "StatusSet::server_errors")]
    pub alarm: StatusSet,
    /// Statuses forwarded to the notification transport
    #[serde(default = "StatusSet::server_errors")]
    pub notify: StatusSet,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            warn: StatusSet::client_errors(),
            alarm: StatusSet::server_errors(),
            notify: StatusSet::server_errors(),
        }
    }
}

impl PolicyConfig {
    pub(crate) fn sets(&self) -> [(&'static str, &StatusSet); 3] {
        [("warn", &self.warn), ("alarm", &self.alarm), ("notify", &self.notify)]
    }
}
