//! Engine bootstrap: waiting for the host loop and handing the engine to it.
//!
//! Bootstrap runs on a dedicated thread because the host loop may not exist
//! yet when the engine is loaded. That thread polls [`HostLoop::is_ready`]
//! until the configured wait expires. On success it posts the engine start to
//! the loop and exits; on timeout the engine is abandoned without any error
//! surfacing to the host.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use ortho_config::OrthoError;
use thiserror::Error;
use tracing::{debug, warn};

use hostwire_config::Config;

use crate::engine::{self, Control, EngineHandle, EngineSettings, EngineState, EngineStatus};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::host::{HostLoop, ModelFactory};
use crate::telemetry;

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");
const BOOTSTRAP_THREAD_NAME: &str = "hostwire-bootstrap";

static PROCESS_ENGINE: OnceCell<EngineHandle> = OnceCell::new();

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a configuration layer fails to parse.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads `QT_INJECTED_*` variables and configuration files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_environment()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The process-wide engine already exists.
    #[error("the automation engine has already been bootstrapped in this process")]
    AlreadyBootstrapped,
    /// The bootstrap thread could not be created.
    #[error("failed to spawn the bootstrap thread: {source}")]
    Spawn {
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
}

/// Bootstraps the process-wide engine.
///
/// Loads configuration from the environment, installs telemetry, and starts
/// waiting for `host` to become ready. Only the first successful call creates
/// an engine.
///
/// # Errors
///
/// Returns [`BootstrapError::AlreadyBootstrapped`] on every call after the
/// first successful one, or the underlying error when configuration cannot
/// be loaded or the bootstrap thread cannot be spawned.
pub fn bootstrap(
    host: Arc<dyn HostLoop>,
    model: ModelFactory,
) -> Result<EngineHandle, BootstrapError> {
    let mut created = false;
    let handle = PROCESS_ENGINE.get_or_try_init(|| {
        created = true;
        bootstrap_process_engine(host, model)
    })?;
    if created {
        Ok(handle.clone())
    } else {
        Err(BootstrapError::AlreadyBootstrapped)
    }
}

fn bootstrap_process_engine(
    host: Arc<dyn HostLoop>,
    model: ModelFactory,
) -> Result<EngineHandle, BootstrapError> {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let config = SystemConfigLoader.load().map_err(|source| {
        let error = BootstrapError::Configuration { source };
        reporter.bootstrap_failed(&error);
        error
    })?;
    match telemetry::initialise(&config) {
        Ok(handle) => {
            debug!(target: BOOTSTRAP_TARGET, sink = ?handle.sink(), "telemetry settled");
        }
        Err(error) => warn!(
            target: BOOTSTRAP_TARGET,
            %error,
            "telemetry not installed; continuing with the host's subscriber"
        ),
    }
    bootstrap_with(&StaticConfigLoader::new(config), reporter, host, model)
}

/// Handle to the process-wide engine, if [`bootstrap`] has succeeded.
#[must_use]
pub fn engine() -> Option<EngineHandle> {
    PROCESS_ENGINE.get().cloned()
}

/// Queues a stop of the process-wide engine.
///
/// Returns `false` when no engine has been bootstrapped.
pub fn shutdown() -> bool {
    PROCESS_ENGINE
        .get()
        .inspect(|handle| handle.shutdown())
        .is_some()
}

/// Bootstraps an engine using the supplied collaborators.
///
/// Unlike [`bootstrap`], nothing guards against creating several engines;
/// embedders and tests own that decision.
///
/// # Errors
///
/// Returns an error when configuration cannot be loaded or the bootstrap
/// thread cannot be spawned. A host loop that never becomes ready is not an
/// error: the returned handle reports [`EngineState::Abandoned`].
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    host: Arc<dyn HostLoop>,
    model: ModelFactory,
) -> Result<EngineHandle, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let (handle, status, controls) = engine::channel();
    let waiter = LoopWaiter {
        wait: config.bootstrap_wait(),
        poll: config.poll_interval(),
        settings: EngineSettings::from(&config),
        status,
        controls,
        reporter: Arc::clone(&reporter),
        host,
        model,
    };
    thread::Builder::new()
        .name(BOOTSTRAP_THREAD_NAME.to_owned())
        .spawn(move || waiter.run())
        .map_err(|source| {
            let error = BootstrapError::Spawn { source };
            reporter.bootstrap_failed(&error);
            error
        })?;
    Ok(handle)
}

/// Everything the bootstrap thread carries to the loop thread.
struct LoopWaiter {
    wait: Duration,
    poll: Duration,
    settings: EngineSettings,
    status: Arc<EngineStatus>,
    controls: Receiver<Control>,
    reporter: Arc<dyn HealthReporter>,
    host: Arc<dyn HostLoop>,
    model: ModelFactory,
}

/// How the wait for the host loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    Ready,
    TimedOut,
    Cancelled,
}

impl LoopWaiter {
    fn run(self) {
        let started = Instant::now();
        let outcome = self.wait_for_loop(started);
        let waited = started.elapsed();
        match outcome {
            WaitOutcome::Ready => self.queue_start(waited),
            WaitOutcome::TimedOut => {
                self.status.set_state(EngineState::Abandoned);
                self.reporter.bootstrap_abandoned(waited);
            }
            WaitOutcome::Cancelled => {
                debug!(target: BOOTSTRAP_TARGET, "shutdown requested before the host loop was ready");
                self.status.set_state(EngineState::Stopped);
            }
        }
    }

    /// Polls at `poll` until the loop is ready or `wait` has elapsed.
    fn wait_for_loop(&self, started: Instant) -> WaitOutcome {
        let deadline = started + self.wait;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut;
            }
            if self.stop_requested() {
                return WaitOutcome::Cancelled;
            }
            if self.host.is_ready() {
                return WaitOutcome::Ready;
            }
            thread::sleep(self.poll.min(deadline - now));
        }
    }

    /// Consumes queued controls; only a stop matters before the engine exists.
    fn stop_requested(&self) -> bool {
        loop {
            match self.controls.try_recv() {
                Ok(Control::Stop) => return true,
                Ok(Control::Start) => {}
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn queue_start(self, waited: Duration) {
        self.status.set_state(EngineState::Queued);
        self.reporter.loop_ready(waited);
        engine::post_launch(
            &self.host,
            self.settings,
            self.status,
            self.controls,
            self.reporter,
            self.model,
        );
    }
}
