//! Client error types.

use relay_protocol::ValidationError;

/// Shown for transport failures and non-2xx responses.
pub const SEND_FAILED: &str = "Failed to send message, please retry";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl ClientError {
    /// Text for the user-facing warning.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(ValidationError::MessageRequired) => {
                "Please enter a message".to_string()
            }
            ClientError::Validation(ValidationError::MessageTooLong { max, .. }) => {
                format!("Message must be at most {max} characters")
            }
            ClientError::Validation(ValidationError::InvalidJson(_)) => SEND_FAILED.to_string(),
            ClientError::Transport(_) | ClientError::Status { .. } => SEND_FAILED.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
