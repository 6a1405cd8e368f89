//! Application state shared across handlers.

use relay_pacing::{Clock, TokioClock};
use relay_protocol::Upstream;
use std::sync::Arc;

use crate::relay::Relay;
use crate::stream_registry::StreamRegistry;
use crate::telemetry::{TelemetryHook, TracingTelemetry};

#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `None` answers every chat request with 500.
    pub upstream: Option<Arc<dyn Upstream>>,
    /// Time source for pacing delays.
    pub clock: Arc<dyn Clock>,
    /// Open relay streams.
    pub streams: Arc<StreamRegistry>,
    pub telemetry: Arc<dyn TelemetryHook>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self::with_upstream(Some(upstream))
    }

    /// State for a router built without an upstream.
    pub fn unconfigured() -> Self {
        Self::with_upstream(None)
    }

    fn with_upstream(upstream: Option<Arc<dyn Upstream>>) -> Self {
        Self {
            upstream,
            clock: Arc::new(TokioClock),
            streams: StreamRegistry::new(),
            telemetry: Arc::new(TracingTelemetry),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetryHook>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Relay wired to this state's upstream, if one is configured.
    pub fn relay(&self) -> Option<Relay> {
        let upstream = self.upstream.as_ref()?;
        Some(
            Relay::new(Arc::clone(upstream), Arc::clone(&self.clock))
                .with_telemetry(Arc::clone(&self.telemetry)),
        )
    }

    pub fn model(&self) -> Option<&str> {
        self.upstream.as_deref().map(|u| u.model())
    }
}
