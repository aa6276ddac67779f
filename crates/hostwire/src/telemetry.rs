//! Structured telemetry initialisation for the engine.
//!
//! The engine lives inside someone else's process. When the host has already
//! installed a global subscriber the engine's events flow there and nothing is
//! installed; otherwise a `tracing-subscriber` fmt subscriber writing to stderr
//! is set up from [`Config`].

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use hostwire_config::{Config, LogFormat};

static TELEMETRY_SINK: OnceCell<TelemetrySink> = OnceCell::new();

/// Where the engine's log events end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetrySink {
    /// The engine installed its own subscriber.
    Installed,
    /// The host process already owned the global subscriber.
    Host,
}

/// Handle returned once telemetry has been settled for the process.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryHandle {
    sink: TelemetrySink,
}

impl TelemetryHandle {
    /// The subscriber receiving engine events.
    #[must_use]
    pub const fn sink(self) -> TelemetrySink {
        self.sink
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression did not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Filter text as configured.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Settles the process-wide subscriber on first use.
///
/// A failed attempt leaves nothing cached, so a later call with a corrected
/// configuration may still install.
pub(crate) fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_SINK
        .get_or_try_init(|| install_subscriber(config))
        .map(|sink| TelemetryHandle { sink: *sink })
}

fn parse_filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })
}

fn install_subscriber(config: &Config) -> Result<TelemetrySink, TelemetryError> {
    let filter = parse_filter(config)?;
    let ansi = io::stderr().is_terminal();
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    };
    // Only fails when a global default already exists.
    Ok(tracing::subscriber::set_global_default(subscriber)
        .map_or(TelemetrySink::Host, |()| TelemetrySink::Installed))
}
