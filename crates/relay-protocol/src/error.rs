//! Error types shared across the relay.

/// A chat request the server (or client) refuses before any stream opens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Message is required")]
    MessageRequired,

    #[error("Invalid JSON")]
    InvalidJson(String),

    #[error("Message must be at most {max} characters (got {len})")]
    MessageTooLong { len: usize, max: usize },
}

/// Failure of the upstream completion call.
///
/// Details stay server-side; clients only ever see the fixed apology.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream payload: {0}")]
    Malformed(String),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream request timed out")]
    Timeout,
}

/// A `data:` payload that is not a valid event.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid event payload: {0}")]
    Json(#[from] serde_json::Error),
}
