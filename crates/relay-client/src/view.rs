//! The output port the renderer draws into.
//!
//! A [`MessageView`] is whatever shows the conversation: a terminal, a GUI
//! list, or [`MemoryView`] in tests. Methods take `&self` because the reveal
//! animation updates the view from its own task.

use parking_lot::Mutex;
use std::fmt;

/// Opaque handle of one rendered message slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg_{}", self.0)
    }
}

/// Who a message slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

pub trait MessageView: Send + Sync {
    /// Show the "assistant is thinking" placeholder.
    fn show_typing_indicator(&self);

    /// Remove the placeholder. No-op when none is shown.
    fn remove_typing_indicator(&self);

    /// Append a message slot and return its id.
    fn add_message(&self, role: Role, content: &str) -> MessageId;

    /// Replace the visible text of a slot.
    fn update_message(&self, id: MessageId, content: &str);

    /// The slot will not change any more.
    fn finish_message(&self, id: MessageId);

    /// Transient user-visible warning (a toast).
    fn warn(&self, message: &str);
}

/// A message slot as recorded by [`MemoryView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub finished: bool,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    messages: Vec<MessageRecord>,
    updates: Vec<(MessageId, String)>,
    warnings: Vec<String>,
    typing: bool,
}

/// A view that keeps everything in memory, including every intermediate update.
#[derive(Debug, Default)]
pub struct MemoryView {
    inner: Mutex<MemoryInner>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<MessageRecord> {
        self.inner.lock().messages.clone()
    }

    pub fn message(&self, id: MessageId) -> Option<MessageRecord> {
        self.inner.lock().messages.iter().find(|m| m.id == id).cloned()
    }

    /// Every text pushed to `id` through `update_message`, in order.
    pub fn updates(&self, id: MessageId) -> Vec<String> {
        self.inner
            .lock()
            .updates
            .iter()
            .filter(|(target, _)| *target == id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.inner.lock().warnings.clone()
    }

    pub fn is_typing(&self) -> bool {
        self.inner.lock().typing
    }
}

impl MessageView for MemoryView {
    fn show_typing_indicator(&self) {
        self.inner.lock().typing = true;
    }

    fn remove_typing_indicator(&self) {
        self.inner.lock().typing = false;
    }

    fn add_message(&self, role: Role, content: &str) -> MessageId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = MessageId::new(inner.next_id);
        inner.messages.push(MessageRecord {
            id,
            role,
            content: content.to_string(),
            finished: false,
        });
        id
    }

    fn update_message(&self, id: MessageId, content: &str) {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.messages.iter_mut().find(|m| m.id == id) {
            message.content = content.to_string();
            inner.updates.push((id, content.to_string()));
        }
    }

    fn finish_message(&self, id: MessageId) {
        if let Some(message) = self.inner.lock().messages.iter_mut().find(|m| m.id == id) {
            message.finished = true;
        }
    }

    fn warn(&self, message: &str) {
        self.inner.lock().warnings.push(message.to_string());
    }
}
