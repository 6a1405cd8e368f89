//! Stream-level properties of the decoder and renderer.

use bytes::Bytes;
use futures::stream;
use relay_client::{MemoryView, Renderer, Reply, ReplyStatus, RevealAnimator};
use relay_pacing::VirtualClock;
use relay_protocol::StreamEvent;
use std::convert::Infallible;
use std::sync::Arc;

const REPLY: &str = "Hello, 世界! Tschüß 👋🏽.";

fn body(reply: &str) -> String {
    let mut body = StreamEvent::Start.frame();
    for unit in reply.chars() {
        body.push_str(&StreamEvent::token(unit.to_string()).frame());
    }
    body.push_str(&StreamEvent::End.frame());
    body
}

async fn render(chunks: Vec<Vec<u8>>) -> (Arc<MemoryView>, Reply) {
    let view = Arc::new(MemoryView::new());
    let animator = RevealAnimator::new(view.clone(), Arc::new(VirtualClock::new()));
    let chunks = stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok::<_, Infallible>(Bytes::from(c))),
    );
    let reply = Renderer::new(view.clone(), animator).run(chunks).await;
    (view, reply)
}

fn split_every(bytes: &[u8], size: usize) -> Vec<Vec<u8>> {
    bytes.chunks(size).map(<[u8]>::to_vec).collect()
}

#[tokio::test]
async fn display_converges_to_full_content() {
    let (view, reply) = render(vec![body(REPLY).into_bytes()]).await;
    assert_eq!(reply.status, ReplyStatus::Completed);
    assert_eq!(reply.content, REPLY);

    let slot = view.message(reply.message_id.unwrap()).unwrap();
    assert_eq!(slot.content, REPLY);
    assert!(slot.finished);
}

#[tokio::test]
async fn intermediate_updates_are_prefixes() {
    let (view, reply) = render(split_every(body(REPLY).as_bytes(), 7)).await;
    for update in view.updates(reply.message_id.unwrap()) {
        assert!(REPLY.starts_with(&update), "{update:?} is not a prefix");
    }
}

#[tokio::test]
async fn any_rechunking_renders_the_same_text() {
    let bytes = body(REPLY).into_bytes();
    for size in [1, 2, 3, 5, 13, 64, bytes.len()] {
        let (_, reply) = render(split_every(&bytes, size)).await;
        assert_eq!(reply.content, REPLY, "chunk size {size}");
        assert_eq!(reply.status, ReplyStatus::Completed);
    }
}

#[tokio::test]
async fn replaying_the_same_bytes_is_idempotent() {
    let chunks = split_every(body(REPLY).as_bytes(), 11);
    let (first_view, first) = render(chunks.clone()).await;
    let (second_view, second) = render(chunks).await;

    assert_eq!(first.content, second.content);
    assert_eq!(
        first_view.message(first.message_id.unwrap()).unwrap().content,
        second_view.message(second.message_id.unwrap()).unwrap().content
    );
}

#[tokio::test]
async fn error_stream_shows_apology() {
    let bytes = format!(
        "{}{}",
        StreamEvent::Start.frame(),
        StreamEvent::error(relay_protocol::APOLOGY).frame()
    );
    let (view, reply) = render(vec![bytes.into_bytes()]).await;
    assert_eq!(reply.status, ReplyStatus::Failed);
    assert_eq!(view.messages().len(), 1);
    assert_eq!(view.messages()[0].content, relay_protocol::APOLOGY);
    assert_eq!(view.warnings(), vec![relay_client::render::ERROR_EVENT_WARNING]);
}

#[tokio::test]
async fn data_after_terminal_is_not_rendered() {
    let bytes = format!("{}{}", body("ok"), StreamEvent::token("!").frame());
    let (_, reply) = render(vec![bytes.into_bytes()]).await;
    assert_eq!(reply.content, "ok");
}

#[tokio::test]
async fn malformed_frames_do_not_stop_rendering() {
    let bytes = format!(
        "{}data: not json\n\n: comment\n\n{}{}",
        StreamEvent::Start.frame(),
        StreamEvent::token("x").frame(),
        StreamEvent::End.frame()
    );
    let (_, reply) = render(vec![bytes.into_bytes()]).await;
    assert_eq!(reply.content, "x");
    assert_eq!(reply.status, ReplyStatus::Completed);
}
