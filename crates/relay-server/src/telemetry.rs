//! Telemetry hooks for relay performance measurement.
//!
//! Provides:
//! - [`RelayMetrics`]: upstream latency, token count, and outcome of one relay
//! - [`TelemetryHook`] trait: callback interface for real-time metric reporting
//! - [`RelayTimer`]: records timestamps and computes metrics
//! - [`NoopTelemetry`] / [`LogTelemetry`] / [`TracingTelemetry`]: built-in hooks

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// How a relay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All tokens and the `end` event were emitted.
    Completed,
    /// The upstream call failed and the apology was emitted.
    UpstreamFailed,
    /// The consumer went away before a terminal event.
    Cancelled,
}

/// Aggregate metrics from one relay.
#[derive(Debug, Clone)]
pub struct RelayMetrics {
    /// Upstream model that produced the reply.
    pub model: String,
    /// Time spent waiting for the upstream completion, in milliseconds.
    pub upstream_ms: f64,
    /// Number of `token` events emitted.
    pub tokens: usize,
    /// Total wall-clock time in milliseconds (upstream + pacing).
    pub total_ms: f64,
    pub outcome: Outcome,
}

/// Callback trait for relay telemetry.
///
/// All methods have default no-op implementations so hooks can be selective.
pub trait TelemetryHook: Send + Sync {
    /// Called once the upstream reply (or failure) arrived.
    fn on_upstream_complete(&self, _upstream_ms: f64) {}

    /// Called after each `token` event is emitted.
    fn on_token(&self, _token_idx: usize, _elapsed_ms: f64) {}

    /// Called when the relay ends, however it ends.
    fn on_relay_complete(&self, _metrics: &RelayMetrics) {}
}

/// No-op telemetry hook.
#[derive(Debug, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetryHook for NoopTelemetry {}

/// Collects metrics into a retrievable report.
#[derive(Debug, Clone, Default)]
pub struct LogTelemetry {
    last_report: Arc<Mutex<Option<RelayMetrics>>>,
}

impl LogTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the last finished relay's metrics.
    pub fn last_metrics(&self) -> Option<RelayMetrics> {
        self.last_report.lock().clone()
    }
}

impl TelemetryHook for LogTelemetry {
    fn on_relay_complete(&self, metrics: &RelayMetrics) {
        *self.last_report.lock() = Some(metrics.clone());
    }
}

/// Emits one `tracing` event per finished relay.
#[derive(Debug, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetryHook for TracingTelemetry {
    fn on_upstream_complete(&self, upstream_ms: f64) {
        tracing::debug!(upstream_ms, "upstream reply received");
    }

    fn on_relay_complete(&self, m: &RelayMetrics) {
        tracing::info!(
            model = %m.model,
            upstream_ms = m.upstream_ms,
            tokens = m.tokens,
            total_ms = m.total_ms,
            outcome = ?m.outcome,
            "relay finished"
        );
    }
}

/// Records timestamps during a relay to compute [`RelayMetrics`].
///
/// Dropping a timer that was never finished reports [`Outcome::Cancelled`],
/// which is what happens when the event stream is dropped mid-relay.
pub struct RelayTimer {
    model: String,
    start: Instant,
    upstream_end: Option<Instant>,
    token_count: usize,
    hook: Arc<dyn TelemetryHook>,
    finished: bool,
}

impl RelayTimer {
    pub fn new(model: impl Into<String>, hook: Arc<dyn TelemetryHook>) -> Self {
        Self {
            model: model.into(),
            start: Instant::now(),
            upstream_end: None,
            token_count: 0,
            hook,
            finished: false,
        }
    }

    /// Mark the upstream call finished. Fires `on_upstream_complete`.
    pub fn mark_upstream(&mut self) {
        let now = Instant::now();
        self.upstream_end = Some(now);
        self.hook
            .on_upstream_complete(now.duration_since(self.start).as_secs_f64() * 1000.0);
    }

    /// Mark one token emitted. Fires `on_token`.
    pub fn mark_token(&mut self) {
        self.token_count += 1;
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.hook.on_token(self.token_count, elapsed_ms);
    }

    pub fn tokens(&self) -> usize {
        self.token_count
    }

    /// Finalize and return metrics. Fires `on_relay_complete`.
    pub fn finish(mut self, outcome: Outcome) -> RelayMetrics {
        self.report(outcome)
    }

    fn report(&mut self, outcome: Outcome) -> RelayMetrics {
        self.finished = true;
        let upstream_ms = self
            .upstream_end
            .map(|t| t.duration_since(self.start).as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        let metrics = RelayMetrics {
            model: self.model.clone(),
            upstream_ms,
            tokens: self.token_count,
            total_ms: self.start.elapsed().as_secs_f64() * 1000.0,
            outcome,
        };
        self.hook.on_relay_complete(&metrics);
        metrics
    }
}

impl Drop for RelayTimer {
    fn drop(&mut self) {
        if !self.finished {
            self.report(Outcome::Cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_telemetry_captures_metrics() {
        let hook = LogTelemetry::new();
        assert!(hook.last_metrics().is_none());

        hook.on_relay_complete(&RelayMetrics {
            model: "m".into(),
            upstream_ms: 12.5,
            tokens: 8,
            total_ms: 112.5,
            outcome: Outcome::Completed,
        });

        let captured = hook.last_metrics().unwrap();
        assert_eq!(captured.upstream_ms, 12.5);
        assert_eq!(captured.tokens, 8);
    }

    #[test]
    fn timer_basic_flow() {
        let log = LogTelemetry::new();
        let mut timer = RelayTimer::new("mock", Arc::new(log.clone()));
        timer.mark_upstream();
        timer.mark_token();
        timer.mark_token();
        assert_eq!(timer.tokens(), 2);

        let metrics = timer.finish(Outcome::Completed);
        assert_eq!(metrics.model, "mock");
        assert_eq!(metrics.tokens, 2);
        assert!(metrics.total_ms >= metrics.upstream_ms);
        assert_eq!(log.last_metrics().unwrap().outcome, Outcome::Completed);
    }

    #[test]
    fn timer_without_upstream_mark() {
        let metrics = RelayTimer::new("m", Arc::new(NoopTelemetry)).finish(Outcome::UpstreamFailed);
        assert_eq!(metrics.upstream_ms, 0.0);
        assert_eq!(metrics.tokens, 0);
    }

    #[test]
    fn dropped_timer_reports_cancelled() {
        let log = LogTelemetry::new();
        {
            let mut timer = RelayTimer::new("m", Arc::new(log.clone()));
            timer.mark_token();
        }
        let captured = log.last_metrics().unwrap();
        assert_eq!(captured.outcome, Outcome::Cancelled);
        assert_eq!(captured.tokens, 1);
    }

    #[test]
    fn finished_timer_reports_once() {
        #[derive(Default)]
        struct Counting(Mutex<usize>);
        impl TelemetryHook for Counting {
            fn on_relay_complete(&self, _: &RelayMetrics) {
                *self.0.lock() += 1;
            }
        }
        let hook = Arc::new(Counting::default());
        RelayTimer::new("m", hook.clone()).finish(Outcome::Completed);
        assert_eq!(*hook.0.lock(), 1);
    }
}
