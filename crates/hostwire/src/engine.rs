//! The engine proper: listener, connections, and session, owned by the host
//! loop thread.
//!
//! Nothing in an [`Engine`] is `Send`. It is built inside a task posted to the
//! loop and from then on is only reached through a self-rescheduling pump
//! task. Other threads talk to it through an [`EngineHandle`], which shares a
//! status cell and queues control messages that the pump applies.

use std::fmt;
use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use hostwire_config::{Config, ListenEndpoint};

use crate::affinity::Deferrer;
use crate::dispatch::{DispatchError, Session, UnknownMethodPolicy};
use crate::health::HealthReporter;
use crate::host::{HostLoop, HostModel, ModelFactory};
use crate::transport::{Connection, EndpointListener, ReadOutcome};

const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::engine");
const PUMP_TASK: &str = "engine.pump";

/// Lifecycle of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The bootstrap thread is polling for the host loop.
    WaitingForLoop,
    /// The loop is ready and the engine start has been posted to it.
    Queued,
    /// The listener is bound.
    Running,
    /// The listener and every connection are closed.
    Stopped,
    /// The host loop never became ready; the engine will never start.
    Abandoned,
}

impl EngineState {
    fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForLoop => "waiting_for_loop",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct StatusInner {
    state: EngineState,
    local_addr: Option<SocketAddr>,
}

/// Status cell shared between the loop thread and every handle.
#[derive(Debug)]
pub(crate) struct EngineStatus {
    inner: Mutex<StatusInner>,
}

impl EngineStatus {
    pub(crate) const fn new() -> Self {
        Self {
            inner: Mutex::new(StatusInner {
                state: EngineState::WaitingForLoop,
                local_addr: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> EngineState {
        self.lock().state
    }

    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        self.lock().local_addr
    }

    pub(crate) fn set_state(&self, state: EngineState) {
        let mut inner = self.lock();
        inner.state = state;
        if state != EngineState::Running {
            inner.local_addr = None;
        }
    }

    fn set_running(&self, addr: SocketAddr) {
        let mut inner = self.lock();
        inner.state = EngineState::Running;
        inner.local_addr = Some(addr);
    }
}

/// Requests queued for the loop thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Start,
    Stop,
}

/// Thread-safe handle to an engine.
///
/// Controls are applied on the loop thread at the engine's next pump, so
/// [`state`](Self::state) reflects them only after that.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    status: Arc<EngineStatus>,
    controls: Sender<Control>,
}

impl EngineHandle {
    pub(crate) const fn new(status: Arc<EngineStatus>, controls: Sender<Control>) -> Self {
        Self { status, controls }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.status.state()
    }

    /// Address the listener is bound to while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.status.local_addr()
    }

    /// Queues a start. A no-op while running; restarts a stopped engine.
    pub fn start(&self) {
        self.send(Control::Start);
    }

    /// Queues a stop. A no-op once stopped.
    pub fn shutdown(&self) {
        self.send(Control::Stop);
    }

    fn send(&self, control: Control) {
        if self.controls.send(control).is_err() {
            debug!(
                target: ENGINE_TARGET,
                ?control,
                state = %self.state(),
                "engine no longer accepts controls"
            );
        }
    }
}

/// Creates the status cell, the handle, and the receiving end of its controls.
pub(crate) fn channel() -> (EngineHandle, Arc<EngineStatus>, Receiver<Control>) {
    let status = Arc::new(EngineStatus::new());
    let (sender, receiver) = mpsc::channel();
    (EngineHandle::new(Arc::clone(&status), sender), status, receiver)
}

/// Engine settings taken from [`Config`].
#[derive(Debug, Clone)]
pub(crate) struct EngineSettings {
    pub(crate) endpoint: ListenEndpoint,
    pub(crate) pump_interval: Duration,
    /// Repost cadence while the engine is not running.
    pub(crate) idle_interval: Duration,
    pub(crate) max_frame_bytes: usize,
    pub(crate) unknown_methods: UnknownMethodPolicy,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            endpoint: config.listen_endpoint(),
            pump_interval: config.pump_interval(),
            idle_interval: config.poll_interval(),
            max_frame_bytes: config.max_frame_bytes(),
            unknown_methods: UnknownMethodPolicy::from_strict_flag(
                config.strict_unknown_method(),
            ),
        }
    }
}

/// Posts construction of the engine to the loop thread, which owns it from
/// then on.
pub(crate) fn post_launch(
    host: &Arc<dyn HostLoop>,
    settings: EngineSettings,
    status: Arc<EngineStatus>,
    controls: Receiver<Control>,
    reporter: Arc<dyn HealthReporter>,
    model: ModelFactory,
) {
    let deferrer = Deferrer::new(Arc::clone(host));
    host.post(Box::new(move || {
        let engine = Engine::new(settings, status, reporter, model(), deferrer.clone());
        EngineDriver::new(engine, controls, deferrer).launch();
    }));
}

/// Loop-thread engine state.
pub(crate) struct Engine {
    settings: EngineSettings,
    status: Arc<EngineStatus>,
    reporter: Arc<dyn HealthReporter>,
    listener: Option<EndpointListener>,
    connections: Vec<Connection>,
    session: Session,
}

impl Engine {
    pub(crate) fn new(
        settings: EngineSettings,
        status: Arc<EngineStatus>,
        reporter: Arc<dyn HealthReporter>,
        model: Box<dyn HostModel>,
        deferrer: Deferrer,
    ) -> Self {
        let session = Session::new(model, deferrer, settings.unknown_methods);
        Self {
            settings,
            status,
            reporter,
            listener: None,
            connections: Vec::new(),
            session,
        }
    }

    /// Binds the listener. A no-op while running.
    pub(crate) fn start(&mut self) {
        if self.listener.is_some() {
            return;
        }
        match EndpointListener::bind(&self.settings.endpoint) {
            Ok(listener) => {
                let addr = listener.local_addr();
                self.listener = Some(listener);
                self.status.set_running(addr);
                self.reporter.engine_started(addr);
            }
            Err(error) => {
                self.status.set_state(EngineState::Stopped);
                self.reporter.engine_start_failed(&error);
            }
        }
    }

    /// Closes the listener and every connection. A no-op once stopped.
    pub(crate) fn stop(&mut self) {
        let was_running = self.listener.take().is_some();
        self.connections.clear();
        if self.status.state() != EngineState::Stopped {
            self.status.set_state(EngineState::Stopped);
        }
        if was_running {
            self.reporter.engine_stopped();
        }
    }

    pub(crate) const fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Accepts new clients, then services every connection once.
    pub(crate) fn pump(&mut self) {
        if self.listener.is_none() {
            return;
        }
        self.accept_pending();
        let session = &self.session;
        self.connections
            .retain_mut(|connection| service(session, connection) == Disposition::Keep);
    }

    fn accept_pending(&mut self) {
        let Some(listener) = &self.listener else {
            return;
        };
        loop {
            match listener.accept() {
                Ok(Some((stream, peer))) => {
                    match Connection::new(stream, peer, self.settings.max_frame_bytes) {
                        Ok(connection) => {
                            debug!(target: ENGINE_TARGET, %peer, "client connected");
                            self.connections.push(connection);
                        }
                        Err(error) => {
                            warn!(target: ENGINE_TARGET, %peer, %error, "failed to configure client socket");
                        }
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(target: ENGINE_TARGET, %error, "accept failed");
                    break;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Keep,
    Close,
}

/// Reads, dispatches every complete frame in order, and flushes.
fn service(session: &Session, connection: &mut Connection) -> Disposition {
    let peer = connection.peer();
    let outcome = match connection.read_available() {
        Ok(outcome) => outcome,
        Err(error) => {
            debug!(target: ENGINE_TARGET, %peer, %error, "read failed; closing");
            return Disposition::Close;
        }
    };

    let mut violated = false;
    loop {
        match connection.next_frame() {
            Ok(Some(payload)) => match session.respond(&payload) {
                Ok(frame) => connection.queue(&frame),
                Err(error) => {
                    log_dispatch_failure(peer, &error);
                    violated = true;
                    break;
                }
            },
            Ok(None) => break,
            Err(error) => {
                log_dispatch_failure(peer, &DispatchError::from(error));
                violated = true;
                break;
            }
        }
    }

    if let Err(error) = connection.flush() {
        debug!(target: ENGINE_TARGET, %peer, %error, "write failed; closing");
        return Disposition::Close;
    }
    if violated || outcome == ReadOutcome::Closed {
        debug!(
            target: ENGINE_TARGET,
            %peer,
            unsent = connection.has_pending_output(),
            "closing connection"
        );
        return Disposition::Close;
    }
    Disposition::Keep
}

fn log_dispatch_failure(peer: SocketAddr, error: &DispatchError) {
    warn!(target: ENGINE_TARGET, %peer, %error, "protocol violation; closing connection");
}

/// Controls collected since the previous pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// The most recent control, if any arrived.
    Latest(Option<Control>),
    /// Every handle is gone and nothing is left to apply.
    Orphaned,
}

/// Owns the engine on the loop thread and reposts itself until retired.
pub(crate) struct EngineDriver {
    engine: Engine,
    controls: Receiver<Control>,
    deferrer: Deferrer,
}

impl EngineDriver {
    pub(crate) const fn new(engine: Engine, controls: Receiver<Control>, deferrer: Deferrer) -> Self {
        Self {
            engine,
            controls,
            deferrer,
        }
    }

    /// Starts the engine unless a stop was queued first, then begins pumping.
    pub(crate) fn launch(mut self) {
        if self.drain_controls() == Pending::Latest(Some(Control::Stop)) {
            self.engine.stop();
        } else {
            self.engine.start();
        }
        self.schedule();
    }

    /// Queues the next tick: every pump interval while serving, otherwise at
    /// the slower idle interval so a stopped engine only polls for controls.
    fn schedule(self) {
        let deferrer = self.deferrer.clone();
        let settings = &self.engine.settings;
        let interval = if self.engine.is_running() {
            settings.pump_interval
        } else {
            settings.idle_interval
        };
        deferrer.defer_after(interval, PUMP_TASK, move || self.tick());
    }

    fn tick(mut self) {
        let pending = self.drain_controls();
        match pending {
            Pending::Latest(Some(Control::Start)) => self.engine.start(),
            Pending::Latest(Some(Control::Stop)) => self.engine.stop(),
            Pending::Latest(None) | Pending::Orphaned => {}
        }
        self.engine.pump();
        if pending == Pending::Orphaned && !self.engine.is_running() {
            debug!(target: ENGINE_TARGET, "all handles dropped; engine retired");
            return;
        }
        self.schedule();
    }

    fn drain_controls(&mut self) -> Pending {
        let mut latest = None;
        loop {
            match self.controls.try_recv() {
                Ok(control) => latest = Some(control),
                Err(TryRecvError::Empty) => return Pending::Latest(latest),
                Err(TryRecvError::Disconnected) if latest.is_some() => {
                    return Pending::Latest(latest);
                }
                Err(TryRecvError::Disconnected) => return Pending::Orphaned,
            }
        }
    }
}
