//! Upstream selection.
//!
//! Provides:
//! - [`Provider`]: which completion backend serves requests
//! - [`Provider::build`]: constructs it, validating the settings it needs

use relay_protocol::Upstream;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{MistralClient, MockUpstream, UpstreamConfig};

/// Completion backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    /// The hosted API. Needs an API key.
    #[default]
    Mistral,
    /// Offline echo backend for local development.
    Mock,
}

impl Provider {
    /// Build the backend.
    ///
    /// `api_key` is required for [`Provider::Mistral`]; `config` supplies the
    /// remaining connection settings.
    pub fn build(
        self,
        api_key: Option<&str>,
        config: impl FnOnce(String) -> UpstreamConfig,
    ) -> Result<Arc<dyn Upstream>, ProviderError> {
        match self {
            Provider::Mistral => {
                let key = api_key
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ProviderError::MissingApiKey)?;
                let client = MistralClient::new(config(key.to_string()))
                    .map_err(|e| ProviderError::Client(e.to_string()))?;
                Ok(Arc::new(client))
            }
            Provider::Mock => Ok(Arc::new(MockUpstream::echo())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Mistral => write!(f, "mistral"),
            Provider::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mistral" => Ok(Provider::Mistral),
            "mock" => Ok(Provider::Mock),
            other => Err(ProviderError::Unknown(other.to_string())),
        }
    }
}

/// Errors from provider selection and construction.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("unknown provider `{0}` (expected one of: mistral, mock)")]
    Unknown(String),
    #[error("failed to build upstream client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for provider in [Provider::Mistral, Provider::Mock] {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!(" MOCK ".parse::<Provider>().unwrap(), Provider::Mock);
    }

    #[test]
    fn unknown_provider_error_lists_choices() {
        let err = "openai".parse::<Provider>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("openai"));
        assert!(msg.contains("mistral"));
    }

    #[test]
    fn mistral_requires_key() {
        let err = Provider::Mistral.build(None, UpstreamConfig::new).err().unwrap();
        assert!(matches!(err, ProviderError::MissingApiKey));
        let blank = Provider::Mistral.build(Some("  "), UpstreamConfig::new).err().unwrap();
        assert!(matches!(blank, ProviderError::MissingApiKey));
    }

    #[test]
    fn mistral_builds_with_key() {
        let upstream = Provider::Mistral
            .build(Some("k"), |key| UpstreamConfig::new(key).with_model("small"))
            .unwrap();
        assert_eq!(upstream.model(), "small");
    }

    #[test]
    fn mock_needs_nothing() {
        let upstream = Provider::Mock.build(None, UpstreamConfig::new).unwrap();
        assert_eq!(upstream.model(), "mock");
    }

    #[test]
    fn default_is_mistral() {
        assert_eq!(Provider::default(), Provider::Mistral);
    }
}
