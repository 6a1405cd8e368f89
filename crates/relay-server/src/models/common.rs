//! Error and health payloads.

use serde::{Deserialize, Serialize};

/// `{"error": "..."}` returned for every refused request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub streams: StreamStats,
    /// Upstream model, absent when no upstream is configured.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StreamStats {
    /// Relay streams currently open.
    pub active: usize,
}
