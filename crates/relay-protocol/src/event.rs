//! Stream events and their `data: <json>` framing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FrameError;

/// Prefix of every event line on the wire.
pub const DATA_PREFIX: &str = "data: ";

/// One lifecycle event of a relay stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Stream accepted; the reply slot can be created.
    Start,
    /// One revealed unit of the reply.
    Token { content: String },
    /// Reply complete.
    End,
    /// Reply failed; `content` is user-facing text.
    Error {
        #[serde(default)]
        content: String,
    },
}

impl StreamEvent {
    pub fn token(content: impl Into<String>) -> Self {
        StreamEvent::Token {
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        StreamEvent::Error {
            content: content.into(),
        }
    }

    /// `End` and `Error` close the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End | StreamEvent::Error { .. })
    }

    /// Wire name of the event (`"start"`, `"token"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Start => "start",
            StreamEvent::Token { .. } => "token",
            StreamEvent::End => "end",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// The JSON payload of the frame, without the `data: ` prefix.
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Start | StreamEvent::End => {
                format!(r#"{{"type":"{}"}}"#, self.kind())
            }
            StreamEvent::Token { content } | StreamEvent::Error { content } => format!(
                r#"{{"type":"{}","content":{}}}"#,
                self.kind(),
                Value::from(content.as_str())
            ),
        }
    }

    /// The complete frame: `data: <json>\n\n`.
    pub fn frame(&self) -> String {
        format!("{DATA_PREFIX}{}\n\n", self.data())
    }

    /// Parse the JSON payload of a `data:` line.
    pub fn from_data(payload: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(payload.trim())?)
    }
}

/// Parse one line of an event stream.
///
/// Returns `None` for lines that are not `data:` lines (blank separators,
/// comments, other SSE fields).
pub fn parse_data_line(line: &str) -> Option<Result<StreamEvent, FrameError>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.strip_prefix(DATA_PREFIX).map(StreamEvent::from_data)
}
