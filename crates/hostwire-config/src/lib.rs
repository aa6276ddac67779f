//! Shared configuration for the hostwire automation engine.
//!
//! The engine runs inside a foreign GUI process, so configuration comes from
//! the environment (and optional configuration files discovered by
//! `ortho_config`), never from the host's command line. Every variable uses the
//! `QT_INJECTED_` prefix, for example `QT_INJECTED_SERVER_PORT`.

mod defaults;
mod endpoint;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BIND_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_FRAME_BYTES, DEFAULT_POLL_MS,
    DEFAULT_PUMP_INTERVAL_MS, DEFAULT_SERVER_PORT, DEFAULT_WAIT_MS, MAX_SERVER_PORT,
    MIN_SERVER_PORT, clamp_port, default_bind_host_string, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use endpoint::ListenEndpoint;
pub use logging::{LogFormat, LogFormatParseError};

/// Program name handed to the loader in place of the host's argv.
const LOADER_PROGRAM_NAME: &str = "hostwire";

/// Resolved engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "QT_INJECTED")]
pub struct Config {
    /// Requested listening port; clamped into `[1, 65535]` on use.
    #[ortho_config(default = DEFAULT_SERVER_PORT)]
    pub server_port: i64,
    /// Address the listener binds to.
    #[ortho_config(default = default_bind_host_string())]
    pub bind_host: String,
    /// Total bootstrap wait for the host loop, in milliseconds.
    #[ortho_config(default = DEFAULT_WAIT_MS)]
    pub wait_ms: u64,
    /// Interval between host loop readiness checks, in milliseconds.
    #[ortho_config(default = DEFAULT_POLL_MS)]
    pub poll_ms: u64,
    /// Interval between socket servicing passes, in milliseconds.
    #[ortho_config(default = DEFAULT_PUMP_INTERVAL_MS)]
    pub pump_interval_ms: u64,
    /// Largest payload a frame may declare.
    #[ortho_config(default = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: u64,
    /// Answer unknown methods with an error envelope instead of the legacy
    /// success envelope.
    #[ortho_config(default = false)]
    pub strict_unknown_method: bool,
    /// Tracing filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            bind_host: default_bind_host_string(),
            wait_ms: DEFAULT_WAIT_MS,
            poll_ms: DEFAULT_POLL_MS,
            pump_interval_ms: DEFAULT_PUMP_INTERVAL_MS,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            strict_unknown_method: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the environment and configuration files only.
    ///
    /// The host process's command line belongs to the host application, so
    /// the loader receives a synthetic argument list containing just a
    /// program name.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when a layer fails to parse.
    pub fn load_from_environment() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter([OsString::from(LOADER_PROGRAM_NAME)])
    }

    /// Endpoint derived from the bind host and the clamped port.
    #[must_use]
    pub fn listen_endpoint(&self) -> ListenEndpoint {
        ListenEndpoint::tcp(self.bind_host.clone(), clamp_port(self.server_port))
    }

    /// Total time the bootstrap thread waits for the host loop.
    #[must_use]
    pub const fn bootstrap_wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    /// Interval between readiness checks; never shorter than one millisecond.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }

    /// Interval between socket servicing passes; never shorter than one millisecond.
    #[must_use]
    pub fn pump_interval(&self) -> Duration {
        Duration::from_millis(self.pump_interval_ms.max(1))
    }

    /// Frame size limit as a native size.
    #[must_use]
    pub fn max_frame_bytes(&self) -> usize {
        usize::try_from(self.max_frame_bytes).unwrap_or(usize::MAX)
    }

    /// Whether unknown methods produce an error envelope.
    #[must_use]
    pub const fn strict_unknown_method(&self) -> bool {
        self.strict_unknown_method
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
