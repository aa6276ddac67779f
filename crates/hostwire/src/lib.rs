//! In-process automation endpoint for live GUI applications.
//!
//! `hostwire` runs inside a graphical application's address space and exposes
//! a length-prefixed JSON request/response protocol over TCP. External test
//! tooling uses it to enumerate, inspect, and drive the application's live
//! object tree (windows, controls, and graphics-scene items) without changes
//! to the application itself.
//!
//! The crate does not talk to any particular GUI toolkit. Embedders implement
//! the traits in [`host`]: [`host::HostLoop`] describes the application's
//! execution loop and [`host::HostModel`] its object tree. Everything that
//! touches the object tree runs on the loop thread; the only other thread the
//! crate creates is the bootstrap thread that waits for the loop to become
//! ready.
//!
//! ## Lifecycle
//!
//! [`bootstrap`] claims the process-wide engine slot, loads configuration
//! from `QT_INJECTED_*` environment variables, and spawns the bootstrap thread.
//! Once the host loop reports ready, construction of the engine is posted to
//! the loop thread, which then owns it for the rest of the process. When the
//! loop never becomes ready within the configured wait the engine quietly
//! never starts. [`shutdown`] queues a stop onto the loop thread.
//!
//! ## Protocol
//!
//! Each frame is `<decimal length>\n<payload>`. Payloads are JSON objects of
//! the form `{"id": 1, "method": "ping", "params": {}}` and responses echo the
//! id together with either `result` or `error`.

mod affinity;
mod bootstrap;
mod dispatch;
mod engine;
mod health;
pub mod host;
mod registry;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap,
    bootstrap_with, engine, shutdown,
};
pub use engine::{EngineHandle, EngineState};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use registry::{Handle, ITEM_HANDLE_BASE};
pub use telemetry::{TelemetryError, TelemetryHandle, TelemetrySink};
pub use transport::{FrameError, ListenerError};
