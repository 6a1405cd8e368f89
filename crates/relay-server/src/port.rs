//! Transport-neutral request/response boundary of the chat endpoint.
//!
//! Adapters convert their transport's request into a [`RelayRequest`], call
//! [`handle`], and render the result: a preflight answer, a JSON error, or a
//! [`RelayStream`] of events to frame.

use bytes::Bytes;
use futures::Stream;
use relay_protocol::{ChatRequest, StreamEvent};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::Method;

use crate::error::ServerError;
use crate::relay::EventStream;
use crate::state::AppState;
use crate::stream_registry::StreamGuard;

/// Headers sent with every event-stream response besides CORS.
pub const SSE_HEADERS: [(&str, &str); 3] = [
    ("content-type", "text/event-stream"),
    ("cache-control", "no-cache"),
    ("connection", "keep-alive"),
];

#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    pub body: Bytes,
}

impl RelayRequest {
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            body: body.into(),
        }
    }
}

pub enum RelayResponse {
    /// `OPTIONS`: 200 with CORS headers and no body.
    Preflight,
    /// Accepted chat request.
    Stream(RelayStream),
}

/// Events of one accepted request, holding its registry slot.
///
/// The slot is released when this stream is dropped. Reaching a terminal
/// event marks the guard finished, so only an early drop counts as a
/// disconnect.
pub struct RelayStream {
    events: EventStream,
    guard: StreamGuard,
}

impl RelayStream {
    pub fn new(events: EventStream, guard: StreamGuard) -> Self {
        Self { events, guard }
    }
}

impl Stream for RelayStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        let polled = self.events.as_mut().poll_next(cx);
        if let Poll::Ready(Some(event)) = &polled {
            if event.is_terminal() {
                self.guard.finish();
            }
        }
        polled
    }
}

/// Route one chat request.
///
/// Checks, in order: preflight, method, body, upstream configuration.
pub fn handle(state: &AppState, request: RelayRequest) -> Result<RelayResponse, ServerError> {
    if request.method == Method::OPTIONS {
        return Ok(RelayResponse::Preflight);
    }
    if request.method != Method::POST {
        return Err(ServerError::MethodNotAllowed);
    }

    let chat = ChatRequest::from_body(&request.body)?;
    let relay = state.relay().ok_or(ServerError::NotConfigured)?;

    let guard = state.streams.open();
    tracing::debug!(
        stream = %guard.id(),
        chars = chat.message.chars().count(),
        "chat request accepted"
    );
    let events = relay.events(chat.message, guard.cancellation_token());
    Ok(RelayResponse::Stream(RelayStream::new(events, guard)))
}
