/// Errors raised while building or using a notification transport
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP transport or connection error
    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Mail relay returned a non-success status
    #[error("notification API error ({status}): {body}")]
    Api {
        /// HTTP status from the relay
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// Transport configuration is unusable
    #[error("invalid notification configuration: {0}")]
    Config(String),
}
