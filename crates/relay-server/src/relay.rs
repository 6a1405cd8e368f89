//! The relay core: one upstream call, then the reply replayed as paced tokens.
//!
//! [`Relay::events`] is transport-independent. It yields [`StreamEvent`]s and
//! sleeps through the injected [`Clock`] between tokens; adapters decide how
//! the events reach the client.

use futures::Stream;
use relay_pacing::{Clock, Paced, PacedText};
use relay_protocol::{StreamEvent, Upstream, APOLOGY};
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::telemetry::{NoopTelemetry, Outcome, RelayTimer, TelemetryHook};

/// Boxed stream of relay events.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Everything one relay run needs.
#[derive(Clone)]
pub struct Relay {
    upstream: Arc<dyn Upstream>,
    clock: Arc<dyn Clock>,
    telemetry: Arc<dyn TelemetryHook>,
}

impl Relay {
    pub fn new(upstream: Arc<dyn Upstream>, clock: Arc<dyn Clock>) -> Self {
        Self {
            upstream,
            clock,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetryHook>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Relay one message.
    ///
    /// Yields `Start`, then either `Error` with the fixed apology (upstream
    /// failure) or one `Token` per grapheme of the reply followed by `End`.
    /// Each token is followed by its pacing delay. Once `cancel` fires the
    /// stream ends without a terminal event and no further delays are awaited.
    pub fn events(&self, message: String, cancel: CancellationToken) -> EventStream {
        let upstream = Arc::clone(&self.upstream);
        let clock = Arc::clone(&self.clock);
        let telemetry = Arc::clone(&self.telemetry);

        Box::pin(async_stream::stream! {
            let mut timer = RelayTimer::new(upstream.model(), telemetry);
            yield StreamEvent::Start;

            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                reply = upstream.complete(&message) => Some(reply),
            };
            let Some(reply) = reply else {
                tracing::debug!("stream cancelled while waiting for upstream");
                return;
            };
            timer.mark_upstream();

            let reply = match reply {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::error!(error = %err, model = upstream.model(), "upstream completion failed");
                    timer.finish(Outcome::UpstreamFailed);
                    yield StreamEvent::error(APOLOGY);
                    return;
                }
            };

            let paced = PacedText::new(&reply);
            tracing::debug!(
                units = paced.unit_count(),
                expected_ms = paced.total_delay().as_millis() as u64,
                "pacing reply"
            );

            for Paced { unit, delay } in paced.iter() {
                if cancel.is_cancelled() {
                    break;
                }
                yield StreamEvent::token(unit);
                timer.mark_token();

                let cancelled = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => true,
                    _ = clock.sleep(delay) => false,
                };
                if cancelled {
                    break;
                }
            }

            if cancel.is_cancelled() {
                tracing::debug!(sent = timer.tokens(), "stream cancelled mid-reply");
                return;
            }
            timer.finish(Outcome::Completed);
            yield StreamEvent::End;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use relay_pacing::VirtualClock;
    use relay_upstream::MockUpstream;
    use std::time::Duration;

    fn relay(upstream: MockUpstream, clock: &VirtualClock) -> Relay {
        Relay::new(Arc::new(upstream), Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn emits_start_tokens_end() {
        let clock = VirtualClock::new();
        let events: Vec<_> = relay(MockUpstream::replying("Hi."), &clock)
            .events("x".into(), CancellationToken::new())
            .collect()
            .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Start,
                StreamEvent::token("H"),
                StreamEvent::token("i"),
                StreamEvent::token("."),
                StreamEvent::End,
            ]
        );
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_millis(30),
                Duration::from_millis(30),
                Duration::from_millis(200)
            ]
        );
    }

    #[tokio::test]
    async fn upstream_failure_yields_apology_only() {
        let clock = VirtualClock::new();
        let events: Vec<_> = relay(MockUpstream::failing(), &clock)
            .events("x".into(), CancellationToken::new())
            .collect()
            .await;

        assert_eq!(events, vec![StreamEvent::Start, StreamEvent::error(APOLOGY)]);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn empty_reply_is_start_end() {
        let clock = VirtualClock::new();
        let events: Vec<_> = relay(MockUpstream::replying(""), &clock)
            .events("x".into(), CancellationToken::new())
            .collect()
            .await;
        assert_eq!(events, vec![StreamEvent::Start, StreamEvent::End]);
    }

    #[tokio::test]
    async fn cancellation_stops_emission() {
        let clock = VirtualClock::new();
        let cancel = CancellationToken::new();
        let mut events = relay(MockUpstream::replying("abcdef"), &clock)
            .events("x".into(), cancel.clone());

        assert_eq!(events.next().await, Some(StreamEvent::Start));
        assert_eq!(events.next().await, Some(StreamEvent::token("a")));
        cancel.cancel();

        let rest: Vec<_> = events.collect().await;
        assert!(rest.iter().all(|e| !e.is_terminal()), "got {rest:?}");
        assert!(clock.sleeps().len() < 6);
    }

    #[tokio::test]
    async fn cancelled_before_upstream_skips_call() {
        let clock = VirtualClock::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let upstream = Arc::new(MockUpstream::replying("abc"));
        let events: Vec<_> = Relay::new(upstream.clone(), Arc::new(clock.clone()))
            .events("x".into(), cancel)
            .collect()
            .await;
        assert_eq!(events, vec![StreamEvent::Start]);
        assert_eq!(upstream.calls(), 0);
    }
}
