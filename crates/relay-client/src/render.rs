//! Client-side rendering of a relay stream.
//!
//! [`RenderState`] is the text of one assistant message: everything received
//! so far and the prefix of it currently on screen. [`Renderer`] dispatches
//! decoded events to the [`MessageView`] and the reveal animation.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use relay_protocol::{StreamEvent, APOLOGY};
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::decoder::EventDecoder;
use crate::reveal::RevealAnimator;
use crate::view::{MessageId, MessageView, Role};

/// Warning shown when the stream carries an `error` event.
pub const ERROR_EVENT_WARNING: &str = "The assistant ran into an error";

/// Warning shown when the stream ends without a terminal event.
pub const CUT_SHORT_WARNING: &str = "The reply was cut short";

/// Received and displayed text of one assistant message.
///
/// `displayed` is always a prefix of `full`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    message_id: MessageId,
    full: String,
    displayed: String,
}

impl RenderState {
    pub fn new(message_id: MessageId) -> Self {
        Self {
            message_id,
            full: String::new(),
            displayed: String::new(),
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// Everything received so far.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// What is on screen.
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    pub fn push(&mut self, content: &str) {
        self.full.push_str(content);
    }

    pub fn is_caught_up(&self) -> bool {
        self.displayed.len() == self.full.len()
    }

    /// Reveal the next grapheme of the hidden suffix and return it.
    pub fn reveal_next(&mut self) -> Option<&str> {
        let start = self.displayed.len();
        let next = self.full[start..].graphemes(true).next()?;
        self.displayed.push_str(next);
        Some(&self.full[start..start + next.len()])
    }

    /// Show everything at once. Returns true if the display changed.
    pub fn sync(&mut self) -> bool {
        if self.is_caught_up() {
            return false;
        }
        self.displayed.clone_from(&self.full);
        true
    }
}

/// Whether the renderer wants more stream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// How a rendered reply ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// `end` received.
    Completed,
    /// `error` received.
    Failed,
    /// The stream ended without a terminal event.
    Truncated,
}

/// Final result of rendering one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message_id: Option<MessageId>,
    pub content: String,
    pub status: ReplyStatus,
}

/// Dispatches stream events to a view.
pub struct Renderer {
    view: Arc<dyn MessageView>,
    animator: RevealAnimator,
    decoder: EventDecoder,
    current: Option<MessageId>,
    content: String,
    status: Option<ReplyStatus>,
}

impl Renderer {
    pub fn new(view: Arc<dyn MessageView>, animator: RevealAnimator) -> Self {
        Self {
            view,
            animator,
            decoder: EventDecoder::new(),
            current: None,
            content: String::new(),
            status: None,
        }
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.current
    }

    /// Render a whole body stream and return the outcome.
    pub async fn run<S, E>(mut self, body: S) -> Reply
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        futures::pin_mut!(body);
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    if self.feed(&bytes).await == Control::Stop {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "response body failed mid-stream");
                    break;
                }
            }
        }
        self.finish().await
    }

    /// Decode `chunk` and handle every complete event in it.
    pub async fn feed(&mut self, chunk: &[u8]) -> Control {
        for event in self.decoder.feed(chunk) {
            if self.handle(event).await == Control::Stop {
                return Control::Stop;
            }
        }
        Control::Continue
    }

    /// Handle one decoded event.
    pub async fn handle(&mut self, event: StreamEvent) -> Control {
        if self.status.is_some() {
            tracing::debug!(kind = event.kind(), "ignoring event after terminal");
            return Control::Stop;
        }

        match event {
            StreamEvent::Start => {
                if self.current.is_some() {
                    tracing::warn!("duplicate start event");
                } else {
                    self.open_slot();
                }
                Control::Continue
            }
            StreamEvent::Token { content } => {
                let id = match self.current {
                    Some(id) => id,
                    None => {
                        tracing::warn!("token before start, opening reply slot");
                        self.open_slot()
                    }
                };
                self.content.push_str(&content);
                self.animator.push(id, &content);
                Control::Continue
            }
            StreamEvent::End => {
                if let Some(id) = self.current {
                    if let Some(full) = self.animator.finish(id).await {
                        self.content = full;
                    }
                    self.view.finish_message(id);
                } else {
                    self.view.remove_typing_indicator();
                }
                self.status = Some(ReplyStatus::Completed);
                Control::Stop
            }
            StreamEvent::Error { content } => {
                let text = if content.is_empty() {
                    APOLOGY.to_string()
                } else {
                    content
                };
                self.view.remove_typing_indicator();
                let id = match self.current {
                    Some(id) => {
                        self.animator.stop(id).await;
                        self.view.update_message(id, &text);
                        id
                    }
                    None => {
                        let id = self.view.add_message(Role::Assistant, &text);
                        self.current = Some(id);
                        id
                    }
                };
                self.view.finish_message(id);
                self.view.warn(ERROR_EVENT_WARNING);
                self.content = text;
                self.status = Some(ReplyStatus::Failed);
                Control::Stop
            }
        }
    }

    /// End of the body. Flushes a trailing line and closes an unterminated reply.
    pub async fn finish(mut self) -> Reply {
        if self.status.is_none() {
            for event in self.decoder.finish() {
                if self.handle(event).await == Control::Stop {
                    break;
                }
            }
        }

        let status = match self.status {
            Some(status) => status,
            None => {
                tracing::warn!(
                    received = self.content.len(),
                    "stream ended without a terminal event"
                );
                match self.current {
                    Some(id) => {
                        if let Some(full) = self.animator.finish(id).await {
                            self.content = full;
                        }
                        self.view.finish_message(id);
                    }
                    None => self.view.remove_typing_indicator(),
                }
                self.view.warn(CUT_SHORT_WARNING);
                ReplyStatus::Truncated
            }
        };

        Reply {
            message_id: self.current,
            content: std::mem::take(&mut self.content),
            status,
        }
    }

    fn open_slot(&mut self) -> MessageId {
        self.view.remove_typing_indicator();
        let id = self.view.add_message(Role::Assistant, "");
        self.animator.start(id);
        self.current = Some(id);
        id
    }
}
