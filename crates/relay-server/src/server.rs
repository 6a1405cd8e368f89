//! Server setup and routing.

use axum::{
    routing::{any, get},
    Router,
};
use relay_protocol::CHAT_PATH;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

use crate::{handlers, state::AppState};

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_PATH, any(handlers::chat::handle_chat))
        .route("/health", get(handlers::health::handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server until ctrl-c, then cancel every open stream.
pub async fn run_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let streams = state.streams.clone();
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!(open = streams.active_count(), "shutting down");
            streams.cancel_all();
        })
        .await
}
