//! Lifecycle bookkeeping for open relay streams.
//!
//! Every accepted chat request registers one stream and receives a
//! [`StreamGuard`]. The guard travels inside the response body; when the client
//! disconnects the body is dropped, the guard cancels the stream's token and
//! the entry leaves the registry.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Tracks open relay streams.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    active: Mutex<HashSet<Uuid>>,
    /// Parent of every stream token; cancelled on shutdown.
    shutdown: CancellationToken,
}

/// Releases a stream's registry slot when dropped.
///
/// Dropping a guard that was never [`finish`](StreamGuard::finish)ed counts
/// as a client disconnect and stops the relay loop through the token.
#[derive(Debug)]
pub struct StreamGuard {
    id: Uuid,
    cancel: CancellationToken,
    registry: Arc<StreamRegistry>,
    finished: bool,
}

impl StreamGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Token the relay loop checks between tokens.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Mark the stream as having reached its terminal event.
    pub fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.registry.active.lock().remove(&self.id);
        if self.finished {
            tracing::debug!(stream = %self.id, "stream closed");
        } else {
            tracing::info!(stream = %self.id, "client disconnected before the stream ended");
        }
    }
}

impl StreamRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new stream.
    pub fn open(self: &Arc<Self>) -> StreamGuard {
        let id = Uuid::new_v4();
        let cancel = self.shutdown.child_token();
        self.active.lock().insert(id);
        tracing::debug!(stream = %id, "stream opened");
        StreamGuard {
            id,
            cancel,
            registry: Arc::clone(self),
            finished: false,
        }
    }

    /// Number of currently open streams.
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// Cancel every open stream, e.g. on shutdown.
    pub fn cancel_all(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_drop_releases_slot_and_cancels() {
        let registry = StreamRegistry::new();
        let guard = registry.open();
        let token = guard.cancellation_token();
        assert_eq!(registry.active_count(), 1);

        drop(guard);
        assert_eq!(registry.active_count(), 0);
        assert!(token.is_cancelled());
    }

    #[test]
    fn streams_are_independent() {
        let registry = StreamRegistry::new();
        let a = registry.open();
        let b = registry.open();
        assert_ne!(a.id(), b.id());

        let a_token = a.cancellation_token();
        drop(a);
        assert!(a_token.is_cancelled());
        assert!(!b.cancellation_token().is_cancelled());
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn cancel_all_reaches_every_stream() {
        let registry = StreamRegistry::new();
        let a = registry.open();
        let mut b = registry.open();
        b.finish();
        registry.cancel_all();
        assert!(a.cancellation_token().is_cancelled());
        assert!(b.cancellation_token().is_cancelled());
    }
}
