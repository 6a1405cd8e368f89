//! The chat request body.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ValidationError, MAX_MESSAGE_CHARS};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// A missing or `null` message deserializes as empty.
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Server-side acceptance: a JSON object with a non-empty `message`.
    ///
    /// Length is not re-checked here; only the client enforces the limit.
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        // The derived visitor would also take `["hi"]` as a sequence of fields.
        if !value.is_object() {
            return Err(ValidationError::InvalidJson(
                "request body must be a JSON object".to_string(),
            ));
        }
        let request: ChatRequest = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        if request.message.is_empty() {
            return Err(ValidationError::MessageRequired);
        }
        Ok(request)
    }

    /// Client-side preparation: trim, then require 1..=1000 characters.
    pub fn for_send(input: &str) -> Result<Self, ValidationError> {
        let message = input.trim();
        if message.is_empty() {
            return Err(ValidationError::MessageRequired);
        }
        let len = message.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong {
                len,
                max: MAX_MESSAGE_CHARS,
            });
        }
        Ok(Self::new(message))
    }
}
