//! JSON bodies of the non-streaming responses.

pub mod common;

pub use common::{ErrorBody, HealthResponse, StreamStats};
