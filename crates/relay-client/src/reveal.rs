//! Per-message reveal animation.
//!
//! Each assistant message gets exactly one animation task, owned by the
//! [`RevealAnimator`] arena. New tokens only grow the target text and wake
//! that task; they never start a second one.

use parking_lot::Mutex;
use relay_pacing::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::render::RenderState;
use crate::view::{MessageId, MessageView};

/// Time between two revealed characters.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(25);

struct Reveal {
    state: Arc<Mutex<RenderState>>,
    wake: Arc<Notify>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct RevealAnimator {
    view: Arc<dyn MessageView>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    active: HashMap<MessageId, Reveal>,
}

impl RevealAnimator {
    pub fn new(view: Arc<dyn MessageView>, clock: Arc<dyn Clock>) -> Self {
        Self {
            view,
            clock,
            interval: DEFAULT_REVEAL_INTERVAL,
            active: HashMap::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the animation task for `id`. Returns false if one already runs.
    pub fn start(&mut self, id: MessageId) -> bool {
        if self.active.contains_key(&id) {
            return false;
        }
        let state = Arc::new(Mutex::new(RenderState::new(id)));
        let wake = Arc::new(Notify::new());
        let cancel = CancellationToken::new();
        let task = tokio::spawn(animate(
            Arc::clone(&state),
            Arc::clone(&wake),
            cancel.clone(),
            Arc::clone(&self.view),
            Arc::clone(&self.clock),
            self.interval,
        ));
        self.active.insert(
            id,
            Reveal {
                state,
                wake,
                cancel,
                task,
            },
        );
        true
    }

    /// Grow the target text of `id`. Returns false if `id` is not animating.
    pub fn push(&self, id: MessageId, content: &str) -> bool {
        match self.active.get(&id) {
            Some(reveal) => {
                reveal.state.lock().push(content);
                reveal.wake.notify_one();
                true
            }
            None => false,
        }
    }

    /// Snapshot of the render state of `id`.
    pub fn state(&self, id: MessageId) -> Option<RenderState> {
        self.active.get(&id).map(|r| r.state.lock().clone())
    }

    pub fn is_animating(&self, id: MessageId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Stop the task for `id` and show the full text at once.
    ///
    /// Returns the full content, or `None` if `id` was not animating. No
    /// update for `id` is issued by the animation after this returns.
    pub async fn finish(&mut self, id: MessageId) -> Option<String> {
        let reveal = self.active.remove(&id)?;
        reveal.cancel.cancel();
        if let Err(err) = reveal.task.await {
            tracing::warn!(message = %id, error = %err, "reveal task ended abnormally");
        }

        let mut state = reveal.state.lock();
        if state.sync() {
            self.view.update_message(id, state.displayed());
        }
        Some(state.full().to_string())
    }

    /// Stop the task for `id` without touching the view.
    pub async fn stop(&mut self, id: MessageId) {
        if let Some(reveal) = self.active.remove(&id) {
            reveal.cancel.cancel();
            if let Err(err) = reveal.task.await {
                tracing::warn!(message = %id, error = %err, "reveal task ended abnormally");
            }
        }
    }
}

impl Drop for RevealAnimator {
    fn drop(&mut self) {
        for reveal in self.active.values() {
            reveal.cancel.cancel();
        }
    }
}

async fn animate(
    state: Arc<Mutex<RenderState>>,
    wake: Arc<Notify>,
    cancel: CancellationToken,
    view: Arc<dyn MessageView>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) {
    let id = state.lock().message_id();
    loop {
        let caught_up = state.lock().is_caught_up();
        if caught_up {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = wake.notified() => continue,
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = clock.sleep(interval) => {}
        }

        let shown = {
            let mut state = state.lock();
            state.reveal_next().is_some().then(|| state.displayed().to_string())
        };
        if cancel.is_cancelled() {
            return;
        }
        if let Some(text) = shown {
            view.update_message(id, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{MemoryView, Role};
    use relay_pacing::VirtualClock;

    fn setup() -> (Arc<MemoryView>, VirtualClock, RevealAnimator, MessageId) {
        let view = Arc::new(MemoryView::new());
        let clock = VirtualClock::new();
        let animator = RevealAnimator::new(view.clone(), Arc::new(clock.clone()));
        let id = view.add_message(Role::Assistant, "");
        (view, clock, animator, id)
    }

    async fn settle(animator: &RevealAnimator, id: MessageId) {
        for _ in 0..1000 {
            if animator.state(id).is_some_and(|s| s.is_caught_up()) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("reveal did not catch up");
    }

    #[tokio::test]
    async fn reveals_one_character_per_tick() {
        let (view, clock, mut animator, id) = setup();
        assert!(animator.start(id));
        animator.push(id, "héllo");
        settle(&animator, id).await;

        assert_eq!(view.updates(id), vec!["h", "hé", "hél", "héll", "héllo"]);
        assert_eq!(clock.sleeps(), vec![DEFAULT_REVEAL_INTERVAL; 5]);
        assert_eq!(animator.finish(id).await.as_deref(), Some("héllo"));
    }

    #[tokio::test]
    async fn growing_target_keeps_single_task() {
        let (view, _clock, mut animator, id) = setup();
        assert!(animator.start(id));
        assert!(!animator.start(id));

        for token in ["a", "b", "c", "d"] {
            animator.push(id, token);
            tokio::task::yield_now().await;
        }
        settle(&animator, id).await;

        let updates = view.updates(id);
        assert_eq!(updates, vec!["a", "ab", "abc", "abcd"]);
        assert_eq!(animator.active_count(), 1);
    }

    #[tokio::test]
    async fn finish_forces_full_text() {
        let (view, _clock, mut animator, id) = setup();
        animator.start(id);
        animator.push(id, "a long reply that has not been revealed yet");

        let full = animator.finish(id).await.unwrap();
        assert_eq!(full, "a long reply that has not been revealed yet");
        assert_eq!(view.message(id).unwrap().content, full);
        assert!(!animator.is_animating(id));

        let updates = view.updates(id);
        assert_eq!(updates.last(), Some(&full));
    }

    #[tokio::test]
    async fn push_to_unknown_message_is_rejected() {
        let (_view, _clock, mut animator, id) = setup();
        assert!(!animator.push(id, "x"));
        assert_eq!(animator.finish(id).await, None);
    }

    #[tokio::test]
    async fn stop_leaves_view_untouched() {
        let (view, _clock, mut animator, id) = setup();
        animator.start(id);
        animator.push(id, "abc");
        animator.stop(id).await;
        assert!(view.updates(id).is_empty());
        assert_eq!(animator.active_count(), 0);
    }
}
