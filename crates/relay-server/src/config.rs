//! Server configuration from the process environment.

use relay_protocol::Upstream;
use relay_upstream::{
    Provider, ProviderError, UpstreamConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var} `{value}`")]
    Invalid { var: &'static str, value: String },

    #[error("cannot resolve listen address `{addr}`: {reason}")]
    Address { addr: String, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Everything the server binary reads at startup.
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub provider: Provider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub upstream_timeout: Duration,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            provider: Provider::default(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            upstream_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Read `MISTRAL_API_KEY`, `MISTRAL_API_BASE`, `MISTRAL_MODEL`,
    /// `UPSTREAM_TIMEOUT_SECS`, `RELAY_PROVIDER`, `HOST` and `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: port })?;
        }
        if let Some(provider) = get("RELAY_PROVIDER") {
            config.provider = provider.parse()?;
        }
        config.api_key = get("MISTRAL_API_KEY");
        if let Some(base) = get("MISTRAL_API_BASE") {
            config.base_url = base;
        }
        if let Some(model) = get("MISTRAL_MODEL") {
            config.model = model;
        }
        if let Some(secs) = get("UPSTREAM_TIMEOUT_SECS") {
            let parsed: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "UPSTREAM_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.upstream_timeout = Duration::from_secs(parsed);
        }
        Ok(config)
    }

    /// Resolve `HOST:PORT` to the address to bind. Hostnames go through the
    /// system resolver; the first result wins.
    pub async fn resolve_addr(&self) -> Result<SocketAddr, ConfigError> {
        let failed = |reason: String| ConfigError::Address {
            addr: format!("{}:{}", self.host, self.port),
            reason,
        };
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| failed(e.to_string()))?;
        addrs
            .next()
            .ok_or_else(|| failed("no addresses found".to_string()))
    }

    /// Build the configured completion backend.
    pub fn build_upstream(&self) -> Result<Arc<dyn Upstream>, ConfigError> {
        let upstream = self.provider.build(self.api_key.as_deref(), |key| {
            UpstreamConfig::new(key)
                .with_base_url(self.base_url.clone())
                .with_model(self.model.clone())
                .with_timeout(self.upstream_timeout)
        })?;
        Ok(upstream)
    }
}
