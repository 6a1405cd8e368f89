//! Server-Sent Events rendering of a relay stream.
//!
//! Each event is sent as `data: {json}\n\n`. The response owns the
//! [`RelayStream`]; when the client disconnects axum drops the body, the
//! stream's guard cancels the relay loop and frees the registry slot.

use axum::http::header::{HeaderName, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use std::convert::Infallible;

use crate::port::{RelayStream, SSE_HEADERS};

/// Render a relay stream as an SSE response.
pub fn sse_response(stream: RelayStream) -> Response {
    let events = stream.map(|event| Ok::<_, Infallible>(Event::default().data(event.data())));
    let mut response = Sse::new(events).into_response();

    let headers = response.headers_mut();
    for (name, value) in SSE_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}
