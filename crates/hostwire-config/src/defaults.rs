//! Default values shared by the configuration model and its callers.

use crate::logging::LogFormat;

/// Port requested when no override is configured.
pub const DEFAULT_SERVER_PORT: i64 = 5555;

/// Loopback address the engine binds to by default.
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";

/// Total time the bootstrap thread waits for the host loop, in milliseconds.
pub const DEFAULT_WAIT_MS: u64 = 30_000;

/// Interval between host loop readiness checks, in milliseconds.
pub const DEFAULT_POLL_MS: u64 = 100;

/// Interval between socket servicing passes on the loop thread, in milliseconds.
pub const DEFAULT_PUMP_INTERVAL_MS: u64 = 10;

/// Largest payload a single frame may declare.
pub const DEFAULT_MAX_FRAME_BYTES: u64 = 1024 * 1024;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Lowest port accepted from configuration.
pub const MIN_SERVER_PORT: i64 = 1;

/// Highest port accepted from configuration.
pub const MAX_SERVER_PORT: i64 = 65_535;

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Owned bind host used where allocation is required.
#[must_use]
pub fn default_bind_host_string() -> String {
    DEFAULT_BIND_HOST.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Clamps a configured port into the bindable range.
///
/// Values below 1 become 1 and values above 65535 become 65535, so a stray
/// environment value never aborts startup.
#[must_use]
pub fn clamp_port(raw: i64) -> u16 {
    let clamped = raw.clamp(MIN_SERVER_PORT, MAX_SERVER_PORT);
    u16::try_from(clamped).unwrap_or(u16::MAX)
}
