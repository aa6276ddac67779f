//! Structured health reporting for engine lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
///
/// Bootstrap events fire on the bootstrap thread; engine events fire on the
/// host loop thread.
#[cfg_attr(test, mockall::automock)]
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked when bootstrap fails before the wait begins.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the host loop reported ready after `waited`.
    fn loop_ready(&self, waited: Duration);

    /// Invoked when the wait for the host loop expired after `waited`.
    fn bootstrap_abandoned(&self, waited: Duration);

    /// Invoked once the listener is bound.
    fn engine_started(&self, addr: SocketAddr);

    /// Invoked when the listener could not be bound.
    fn engine_start_failed(&self, error: &ListenerError);

    /// Invoked after the listener and every connection were closed.
    fn engine_stopped(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn loop_ready(&self, waited: Duration) {
        (**self).loop_ready(waited);
    }

    fn bootstrap_abandoned(&self, waited: Duration) {
        (**self).bootstrap_abandoned(waited);
    }

    fn engine_started(&self, addr: SocketAddr) {
        (**self).engine_started(addr);
    }

    fn engine_start_failed(&self, error: &ListenerError) {
        (**self).engine_start_failed(error);
    }

    fn engine_stopped(&self) {
        (**self).engine_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting engine bootstrap"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "engine bootstrap failed"
        );
    }

    fn loop_ready(&self, waited: Duration) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "loop_ready",
            waited_ms = waited.as_millis(),
            "host loop ready; engine start queued"
        );
    }

    fn bootstrap_abandoned(&self, waited: Duration) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "bootstrap_abandoned",
            waited_ms = waited.as_millis(),
            "host loop never became ready; engine will not start"
        );
    }

    fn engine_started(&self, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "engine_started",
            %addr,
            "automation endpoint listening"
        );
    }

    fn engine_start_failed(&self, error: &ListenerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "engine_start_failed",
            error = %error,
            "automation endpoint failed to bind"
        );
    }

    fn engine_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "engine_stopped",
            "automation endpoint stopped"
        );
    }
}
