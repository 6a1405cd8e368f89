//! Health check handler.

use axum::{extract::State, Json};

use crate::models::{HealthResponse, StreamStats};
use crate::state::AppState;

/// Handle health check requests. Includes open stream count.
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        streams: StreamStats {
            active: state.streams.active_count(),
        },
        model: state.model().map(str::to_string),
    })
}
