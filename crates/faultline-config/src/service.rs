use serde::Deserialize;

/// Identity of the service the error layer is mounted in
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name used in notification subjects
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { name: default_name() }
    }
}

fn default_name() -> String {
    "faultline".to_string()
}
