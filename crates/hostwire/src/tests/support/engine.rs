//! An engine running on its own loop thread, for socket-level suites.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hostwire_config::ListenEndpoint;

use super::client::{Client, wait_for_state};
use super::host::{LoopThread, MockModel};
use super::reporter::RecordingHealthReporter;
use crate::dispatch::UnknownMethodPolicy;
use crate::engine::{self, EngineHandle, EngineSettings, EngineState};
use crate::health::HealthReporter;
use crate::host::ModelFactory;

/// Frame limit of test engines.
pub(crate) const MAX_FRAME_BYTES: usize = 4096;

/// An engine posted to its own loop thread.
///
/// The loop thread is declared first so that it stops, and drops the engine
/// on its own thread, before anything else is torn down.
pub(crate) struct RunningEngine {
    _host: LoopThread,
    pub(crate) handle: EngineHandle,
    pub(crate) reporter: Arc<RecordingHealthReporter>,
}

impl RunningEngine {
    pub(crate) fn launch(
        endpoint: ListenEndpoint,
        policy: UnknownMethodPolicy,
        model: ModelFactory,
    ) -> Self {
        let host = LoopThread::spawn();
        let (handle, status, controls) = engine::channel();
        let reporter = Arc::new(RecordingHealthReporter::default());
        let settings = EngineSettings {
            endpoint,
            pump_interval: Duration::from_millis(2),
            idle_interval: Duration::from_millis(2),
            max_frame_bytes: MAX_FRAME_BYTES,
            unknown_methods: policy,
        };
        engine::post_launch(
            &host.host(),
            settings,
            status,
            controls,
            Arc::clone(&reporter) as Arc<dyn HealthReporter>,
            model,
        );
        Self {
            _host: host,
            handle,
            reporter,
        }
    }

    pub(crate) fn ephemeral(policy: UnknownMethodPolicy, model: ModelFactory) -> Self {
        let engine = Self::launch(ListenEndpoint::tcp("127.0.0.1", 0), policy, model);
        assert!(
            wait_for_state(&engine.handle, EngineState::Running),
            "engine did not start: {:?}",
            engine.handle.state()
        );
        engine
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.handle.local_addr().expect("running engine has an address")
    }

    pub(crate) fn connect(&self) -> Client {
        Client::connect(self.addr())
    }
}

pub(crate) fn legacy() -> RunningEngine {
    RunningEngine::ephemeral(UnknownMethodPolicy::Legacy, MockModel::factory())
}

pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
