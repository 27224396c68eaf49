use std::time::Duration;

use async_trait::async_trait;
use faultline_config::NotificationConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::{Notification, NotificationTransport, NotifyError};

/// Mail delivery through an HTTP relay
///
/// POSTs `{ from, subject, body, recipients }` as JSON to the configured
/// endpoint. Clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpMailTransport {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<SecretString>,
    from: String,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    subject: &'a str,
    body: &'a str,
    recipients: &'a [String],
}

impl HttpMailTransport {
    /// Create a transport for the given relay endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        endpoint: Url,
        api_key: Option<SecretString>,
        from: String,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NotifyError::Request)?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            from,
        })
    }

    /// Create a transport from the `[notification]` config section
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout cannot be parsed or the HTTP client
    /// cannot be built
    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let timeout = duration_str::parse(&config.timeout)
            .map_err(|e| NotifyError::Config(format!("invalid timeout '{}': {e}", config.timeout)))?;

        Self::new(config.endpoint.clone(), config.api_key.clone(), config.from.clone(), timeout)
    }
}

#[async_trait]
impl NotificationTransport for HttpMailTransport {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let body = MailRequest {
            from: &self.from,
            subject: &notification.subject,
            body: &notification.body,
            recipients: &notification.recipients,
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Api { status, body })
        }
    }
}

impl std::fmt::Debug for HttpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}
