//! Test double for [`HealthReporter`] that records lifecycle events.

use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::transport::ListenerError;

/// Lifecycle events observed during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapFailed(String),
    LoopReady,
    BootstrapAbandoned,
    EngineStarted(SocketAddr),
    EngineStartFailed(String),
    EngineStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn loop_ready(&self, _waited: Duration) {
        self.record(HealthEvent::LoopReady);
    }

    fn bootstrap_abandoned(&self, _waited: Duration) {
        self.record(HealthEvent::BootstrapAbandoned);
    }

    fn engine_started(&self, addr: SocketAddr) {
        self.record(HealthEvent::EngineStarted(addr));
    }

    fn engine_start_failed(&self, error: &ListenerError) {
        self.record(HealthEvent::EngineStartFailed(error.to_string()));
    }

    fn engine_stopped(&self) {
        self.record(HealthEvent::EngineStopped);
    }
}
