//! # relay-upstream
//!
//! Completion backends for the relay. Each implements
//! [`relay_protocol::Upstream`]: one user message in, one finished reply out.
//!
//! - [`MistralClient`]: the hosted chat-completions API over HTTPS
//! - [`MockUpstream`]: canned replies for tests and offline demos
//! - [`Provider`]: picks one of the above from configuration

mod config;
mod mistral;
mod mock;
mod provider;

pub use config::{UpstreamConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use mistral::MistralClient;
pub use mock::MockUpstream;
pub use provider::{Provider, ProviderError};
