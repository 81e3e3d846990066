#![allow(dead_code)]

use rv_supervisor::{
    HealthChecker, Initializer, LaunchSettings, LaunchSpec, LifecycleController, ProcessControl,
    ProcessExit, ProcessHandle, ProcessSupervisor, ReadinessBroadcaster, ServerEndpoint,
    SupervisorResult,
};

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PREFIX: &str = "/api/v1/system";
pub const HEALTH_PATH: &str = "/api/v1/system/health";
pub const INITIALIZE_PATH: &str = "/api/v1/system/initialize";

pub fn base_url(server: &MockServer) -> String {
    format!("{}{API_PREFIX}", server.uri())
}

/// Base URL of a port nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}{API_PREFIX}")
}

/// Health answers `failures` times with 503, then 200.
pub async fn mount_health(server: &MockServer, failures: u64) {
    if failures > 0 {
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(server)
        .await;
}

pub async fn mount_initialize(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(INITIALIZE_PATH))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(serde_json::json!({"status": "success"})),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn sleep_spec(secs: u32) -> LaunchSpec {
    LaunchSpec::new("sleep").args([secs.to_string()])
}

pub fn shell_spec(script: &str) -> LaunchSpec {
    LaunchSpec::new("sh").args(["-c", script])
}

/// Wraps the real supervisor and counts spawn and kill calls.
pub struct CountingSupervisor {
    inner: ProcessSupervisor,
    spawns: AtomicUsize,
    kills: AtomicUsize,
}

impl CountingSupervisor {
    pub fn new() -> Self {
        Self {
            inner: ProcessSupervisor::new(Duration::from_millis(500)),
            spawns: AtomicUsize::new(0),
            kills: AtomicUsize::new(0),
        }
    }

    pub fn spawns(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessControl for CountingSupervisor {
    async fn spawn(&self, spec: &LaunchSpec) -> SupervisorResult<ProcessHandle> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        self.inner.spawn(spec).await
    }

    async fn kill(&self) {
        self.kills.fetch_add(1, Ordering::SeqCst);
        self.inner.kill().await
    }

    fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    fn current(&self) -> Option<ProcessHandle> {
        self.inner.current()
    }

    fn subscribe_exits(&self) -> broadcast::Receiver<ProcessExit> {
        self.inner.subscribe_exits()
    }
}

pub struct Harness {
    pub controller: Arc<LifecycleController>,
    pub supervisor: Arc<CountingSupervisor>,
    pub readiness: Arc<ReadinessBroadcaster>,
    pub readiness_history: Arc<Mutex<Vec<bool>>>,
}

impl Harness {
    pub fn new(
        base_url: &str,
        launch: LaunchSpec,
        project_root: Option<PathBuf>,
        startup_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        let endpoint = ServerEndpoint::parse(base_url).unwrap();
        let supervisor = Arc::new(CountingSupervisor::new());
        let readiness = Arc::new(ReadinessBroadcaster::new());
        let health =
            Arc::new(HealthChecker::new(endpoint.clone(), Duration::from_millis(500)).unwrap());
        let initializer = Arc::new(Initializer::new(endpoint, Duration::from_secs(5)).unwrap());

        let readiness_history = Arc::new(Mutex::new(Vec::new()));
        let history = readiness_history.clone();
        let _ = readiness.subscribe(move |ready| history.lock().unwrap().push(ready));

        let settings = LaunchSettings {
            launch,
            project_root,
            startup_timeout,
            poll_interval,
        };

        let controller = Arc::new(LifecycleController::new(
            settings,
            supervisor.clone(),
            health,
            initializer,
            readiness.clone(),
        ));

        Self {
            controller,
            supervisor,
            readiness,
            readiness_history,
        }
    }

    pub fn readiness_history(&self) -> Vec<bool> {
        self.readiness_history.lock().unwrap().clone()
    }
}

/// Everything currently buffered on a broadcast receiver.
pub fn drain<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}
