//! Canned completion backend.

use async_trait::async_trait;
use relay_protocol::{Upstream, UpstreamError, UpstreamResult};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Echo,
    Fail,
}

/// An [`Upstream`] that answers without any network access.
#[derive(Debug)]
pub struct MockUpstream {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockUpstream {
    /// Always answers with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(reply.into()))
    }

    /// Answers with the user's own message.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Always fails as if the API returned 500.
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completed `complete` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn complete(&self, message: &str) -> UpstreamResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::Echo => Ok(message.to_string()),
            Behavior::Fail => Err(UpstreamError::Status {
                status: 500,
                body: "mock failure".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
