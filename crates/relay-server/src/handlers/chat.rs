//! Chat relay handler.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    error::ServerError,
    port::{self, RelayRequest, RelayResponse},
    state::AppState,
    streaming,
};

/// Handle every method on the chat path.
///
/// The body is read as raw bytes so malformed JSON is answered with the flat
/// `{"error": "Invalid JSON"}` body rather than axum's rejection text.
pub async fn handle_chat(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response, ServerError> {
    match port::handle(&state, RelayRequest::new(method, body))? {
        RelayResponse::Preflight => Ok(StatusCode::OK.into_response()),
        RelayResponse::Stream(stream) => Ok(streaming::sse_response(stream)),
    }
}
