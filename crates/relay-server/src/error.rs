//! HTTP error handling and response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_protocol::ValidationError;

use crate::models::ErrorBody;

/// A request refused before any stream opens.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("API key not configured")]
    NotConfigured,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// The flat `{"error": ...}` body sent to the client.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Validation(ValidationError::InvalidJson(detail)) => {
                tracing::debug!(%detail, "rejected request body");
            }
            ServerError::NotConfigured => {
                tracing::error!("chat request received but no upstream is configured");
            }
            _ => tracing::debug!(error = %self, "rejected request"),
        }
        (self.status(), Json(self.body())).into_response()
    }
}
