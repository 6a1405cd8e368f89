//! HTTP request handlers for API endpoints.

pub mod chat;
pub mod health;

pub use chat::handle_chat;
pub use health::handle_health;
