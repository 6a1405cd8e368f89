//! # relay-server
//!
//! HTTP front of the typewriter relay.
//!
//! A chat request is answered with one Server-Sent Events stream: `start`,
//! one `token` per grapheme of the finished upstream reply (each followed by
//! its pacing delay), then `end`, or `error` with a fixed apology when the
//! upstream call fails.
//!
//! The relay itself ([`relay::Relay`]) knows nothing about HTTP. The
//! [`port`] module turns a method and body into either a JSON error or an
//! event stream; [`handlers`] adapts that to axum.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod port;
pub mod relay;
pub mod server;
pub mod state;
pub mod stream_registry;
pub mod streaming;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{create_router, run_server};
pub use state::AppState;
pub use stream_registry::{StreamGuard, StreamRegistry};
