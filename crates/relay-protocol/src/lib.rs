//! # relay-protocol
//!
//! The "narrow waist" of the relay stack. Defines the wire types shared by the
//! server and the client ([`ChatRequest`], [`StreamEvent`]), the event-stream
//! framing, and the [`Upstream`] trait every completion backend implements.
//!
//! ## Design Notes
//!
//! ### Framing
//! Every event travels as one `data: <json>\n\n` frame. The JSON object is
//! `{"type": "start" | "token" | "end" | "error", "content"?: string}`.
//! Frames carry no `event:` or `id:` fields, so any SSE reader that only
//! understands `data:` lines can consume the stream.
//!
//! ### Lifecycle
//! A well-formed stream is exactly one `Start`, zero or more `Token`s and one
//! terminal event (`End` or `Error`). Nothing follows a terminal event.
//!
//! ### Upstream
//! [`Upstream`] methods take `&self` so a single client can serve many
//! concurrent requests. Implementations own their own HTTP connection pools.

mod error;
mod event;
mod request;

pub use error::{FrameError, UpstreamError, ValidationError};
pub use event::{parse_data_line, StreamEvent, DATA_PREFIX};
pub use request::ChatRequest;

use async_trait::async_trait;

/// Result type for upstream completion calls.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Opaque text sent to the client when the upstream call fails.
pub const APOLOGY: &str = "Sorry, there was an error processing your request.";

/// Longest message a client may send, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Path of the relay endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// A completion backend: one user message in, one complete reply out.
///
/// No retries and no streaming consumption of the upstream call itself; the
/// relay paces the finished reply on its own.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send `message` as a single user turn and return the full reply text.
    async fn complete(&self, message: &str) -> UpstreamResult<String>;

    /// Model identifier reported in logs and health output.
    fn model(&self) -> &str;
}
