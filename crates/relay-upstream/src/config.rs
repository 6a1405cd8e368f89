//! Configuration for the hosted completion client.

use std::fmt;
use std::time::Duration;

/// Base URL of the hosted API.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Model every request is sent to unless overridden.
pub const DEFAULT_MODEL: &str = "devstral-medium-latest";

/// Upper bound on one upstream round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`crate::MistralClient`].
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Bearer token. Never logged.
    pub api_key: String,

    /// Scheme and host, without the `/v1/...` path.
    pub base_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Whole-request timeout.
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Defaults for everything except the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
