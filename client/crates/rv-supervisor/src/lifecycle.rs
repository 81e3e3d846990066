//! Start sequence orchestration: spawn, health polling, initialization.

use crate::{
    CancelSignal, ExitReason, HealthChecker, Initializer, LaunchSpec, LifecycleState, Notice,
    PollOutcome, ProcessControl, ProcessExit, ProcessHandle, ProgressEvent, ReadinessBroadcaster,
    RunCancellation, ServerStatus, Stage, SupervisorError, SupervisorResult, build_server_status,
};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, error, info, warn};

const PROGRESS_CHANNEL_CAPACITY: usize = 32;
const NOTICE_CHANNEL_CAPACITY: usize = 32;

/// Resolves the lint config file at initialization time.
pub type ConfigLocator = Arc<dyn Fn() -> Option<PathBuf> + Send + Sync>;

/// Parameters for every run of the start sequence.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub launch: LaunchSpec,
    pub project_root: Option<PathBuf>,
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
}

enum Waited {
    Poll(PollOutcome),
    Exited(ProcessExit),
}

enum Initialized {
    Done(SupervisorResult<()>),
    Exited(ProcessExit),
    Cancelled,
}

/// Drives the backend from Idle to Ready.
///
/// One run executes at a time. `start` is rejected while a run is in
/// flight; `restart` cancels the in-flight run and queues behind it.
pub struct LifecycleController {
    settings: LaunchSettings,
    supervisor: Arc<dyn ProcessControl>,
    health: Arc<HealthChecker>,
    initializer: Arc<Initializer>,
    readiness: Arc<ReadinessBroadcaster>,
    config_locator: Option<ConfigLocator>,
    state_tx: Arc<watch::Sender<LifecycleState>>,
    state_rx: watch::Receiver<LifecycleState>,
    progress_tx: broadcast::Sender<ProgressEvent>,
    notice_tx: broadcast::Sender<Notice>,
    run_lock: Mutex<()>,
    run_id: Arc<AtomicU64>,
    cancellation: RunCancellation,
}

impl LifecycleController {
    pub fn new(
        settings: LaunchSettings,
        supervisor: Arc<dyn ProcessControl>,
        health: Arc<HealthChecker>,
        initializer: Arc<Initializer>,
        readiness: Arc<ReadinessBroadcaster>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(LifecycleState::Idle);
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        Self {
            settings,
            supervisor,
            health,
            initializer,
            readiness,
            config_locator: None,
            state_tx: Arc::new(state_tx),
            state_rx,
            progress_tx,
            notice_tx,
            run_lock: Mutex::new(()),
            run_id: Arc::new(AtomicU64::new(0)),
            cancellation: RunCancellation::new(),
        }
    }

    pub fn with_config_locator(mut self, locator: ConfigLocator) -> Self {
        self.config_locator = Some(locator);
        self
    }

    /// Run the start sequence.
    ///
    /// Returns [`SupervisorError::RunInProgress`] without side effects when
    /// another run is in flight.
    pub async fn start(&self) -> SupervisorResult<()> {
        let Ok(_run) = self.run_lock.try_lock() else {
            warn!("Start requested while a start sequence is in progress");
            return Err(SupervisorError::run_in_progress());
        };

        self.run().await
    }

    /// Cancel any in-flight run, kill the backend once, and start fresh.
    pub async fn restart(&self) -> SupervisorResult<()> {
        info!("Restarting backend");
        self.supersede();

        let _run = self.run_lock.lock().await;
        self.readiness.set_ready(false);
        self.supervisor.kill().await;
        self.set_state(LifecycleState::Idle);

        self.run().await
    }

    /// Cancel any in-flight run and kill the backend.
    pub async fn stop(&self) {
        info!("Stopping backend");
        self.supersede();

        let _run = self.run_lock.lock().await;
        self.readiness.set_ready(false);
        self.supervisor.kill().await;
        self.set_state(LifecycleState::Idle);
    }

    pub fn state(&self) -> LifecycleState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_rx.clone()
    }

    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress_tx.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    pub fn readiness(&self) -> &Arc<ReadinessBroadcaster> {
        &self.readiness
    }

    /// Probe the backend once and refresh the cached health status.
    pub async fn probe(&self) -> bool {
        self.health.is_reachable().await
    }

    pub async fn status(&self) -> ServerStatus {
        build_server_status(
            &self.state(),
            self.readiness.is_ready(),
            self.health.status().await,
            self.supervisor.current().map(|handle| handle.pid()),
            &self.health.endpoint().to_string(),
        )
    }

    /// Invalidate the current run and its crash monitor.
    fn supersede(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
        self.cancellation.cancel_all();
    }

    async fn run(&self) -> SupervisorResult<()> {
        let run_id = self.run_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut cancel = self.cancellation.signal();
        debug!("Start sequence {run_id} begins");
        self.set_state(LifecycleState::Idle);

        self.report(Stage::Checking);

        // Subscribe before looking at or spawning a process so no exit is missed.
        let mut exits = self.supervisor.subscribe_exits();
        let reachable = self.health.is_reachable().await;
        let owned = self.supervisor.current().filter(|handle| !handle.has_exited());

        if reachable && owned.is_none() {
            info!(
                "Backend already reachable at {}, skipping launch",
                self.health.endpoint()
            );
            self.notify(Notice::info("Backend already running"));
            self.enter_ready();
            return Ok(());
        }

        if cancel.is_cancelled() {
            return self.abandon(run_id);
        }

        let Some(project_root) = self
            .settings
            .project_root
            .clone()
            .filter(|root| !root.as_os_str().is_empty())
        else {
            return self.fail(SupervisorError::missing_project_root());
        };

        let handle = match owned {
            Some(handle) if reachable => {
                info!(
                    "Backend process {} is up but not initialized, resuming at initialization",
                    handle.pid()
                );
                handle
            }
            _ => self.launch(run_id, &mut exits, &mut cancel).await?,
        };

        self.set_state(LifecycleState::Initializing);
        self.report(Stage::Initializing);

        let config_file = self.config_locator.as_ref().and_then(|locate| locate());

        let initialized = tokio::select! {
            result = self.initializer.initialize(&project_root, config_file.as_deref()) => {
                Initialized::Done(result.map(|_| ()))
            }
            Some(exit) = next_exit(&mut exits, &handle) => Initialized::Exited(exit),
            _ = cancel.cancelled() => Initialized::Cancelled,
        };

        match initialized {
            Initialized::Done(Ok(())) => {}
            // Process is left running.
            Initialized::Done(Err(e)) => return self.fail(e),
            Initialized::Exited(exit) if exit.reason == ExitReason::Killed => {
                return self.abandon(run_id);
            }
            Initialized::Exited(exit) => {
                return self.fail(SupervisorError::process_crashed(exit.code));
            }
            Initialized::Cancelled => return self.abandon(run_id),
        }

        if handle.has_exited() {
            return self.fail(SupervisorError::process_crashed(handle.exit_code()));
        }
        if cancel.is_cancelled() {
            return self.abandon(run_id);
        }

        self.enter_ready();
        self.monitor_crash(run_id, handle, exits);
        Ok(())
    }

    /// Spawn the backend and wait for its health endpoint.
    ///
    /// Any process this controller still owns is replaced by the spawn.
    async fn launch(
        &self,
        run_id: u64,
        exits: &mut broadcast::Receiver<ProcessExit>,
        cancel: &mut CancelSignal,
    ) -> SupervisorResult<ProcessHandle> {
        self.readiness.set_ready(false);
        self.set_state(LifecycleState::Starting);
        self.report(Stage::Starting);

        let handle = match self.supervisor.spawn(&self.settings.launch).await {
            Ok(handle) => handle,
            Err(e) => return self.fail(e),
        };

        self.set_state(LifecycleState::WaitingHealthy);
        self.report(Stage::WaitingHealthy);

        let waited = tokio::select! {
            outcome = self.health.poll_until_healthy(
                self.settings.startup_timeout,
                self.settings.poll_interval,
                cancel,
            ) => Waited::Poll(outcome),
            Some(exit) = next_exit(exits, &handle) => Waited::Exited(exit),
        };

        match waited {
            Waited::Poll(PollOutcome::Healthy) => Ok(handle),
            Waited::Poll(PollOutcome::TimedOut) => {
                self.supervisor.kill().await;
                self.fail(SupervisorError::health_timeout(
                    self.settings.startup_timeout.as_millis() as u64,
                ))
            }
            Waited::Poll(PollOutcome::Cancelled) => self.abandon(run_id),
            Waited::Exited(exit) if exit.reason == ExitReason::Killed => self.abandon(run_id),
            Waited::Exited(exit) => self.fail(SupervisorError::exited_before_healthy(exit.code)),
        }
    }

    fn enter_ready(&self) {
        self.set_state(LifecycleState::Ready);
        self.readiness.set_ready(true);
        self.report(Stage::Done);
        self.notify(Notice::info("Backend is ready"));
    }

    fn fail<T>(&self, error: SupervisorError) -> SupervisorResult<T> {
        error!("Backend start failed: {error}");
        self.readiness.set_ready(false);
        self.set_state(LifecycleState::Failed {
            error: error.summary(),
        });
        self.notify(Notice::Error {
            message: error.summary(),
            hint: error.recovery_hint().to_string(),
        });
        Err(error)
    }

    fn abandon<T>(&self, run_id: u64) -> SupervisorResult<T> {
        info!("Start sequence {run_id} cancelled");
        Err(SupervisorError::cancelled())
    }

    /// Watch a Ready backend for an unexpected exit.
    fn monitor_crash(
        &self,
        run_id: u64,
        handle: ProcessHandle,
        mut exits: broadcast::Receiver<ProcessExit>,
    ) {
        let state_tx = Arc::clone(&self.state_tx);
        let readiness = Arc::clone(&self.readiness);
        let notice_tx = self.notice_tx.clone();
        let current_run = Arc::clone(&self.run_id);

        tokio::spawn(async move {
            let Some(exit) = next_exit(&mut exits, &handle).await else {
                return;
            };

            if exit.reason == ExitReason::Killed || current_run.load(Ordering::SeqCst) != run_id {
                return;
            }

            let crash = SupervisorError::process_crashed(exit.code);
            let mut crashed = false;
            state_tx.send_if_modified(|state| {
                if *state != LifecycleState::Ready {
                    return false;
                }
                *state = LifecycleState::Failed {
                    error: crash.summary(),
                };
                crashed = true;
                true
            });

            if crashed {
                error!("Backend crashed after becoming ready: {crash}");
                readiness.set_ready(false);
                let _ = notice_tx.send(Notice::Error {
                    message: crash.summary(),
                    hint: crash.recovery_hint().to_string(),
                });
            }
        });
    }

    fn set_state(&self, state: LifecycleState) {
        debug!("Lifecycle state -> {state}");
        self.state_tx.send_replace(state);
    }

    fn report(&self, stage: Stage) {
        let _ = self.progress_tx.send(ProgressEvent::from(stage));
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notice_tx.send(notice);
    }
}

/// Next exit of `handle`'s process; `None` once the channel closes.
async fn next_exit(
    exits: &mut broadcast::Receiver<ProcessExit>,
    handle: &ProcessHandle,
) -> Option<ProcessExit> {
    loop {
        match exits.recv().await {
            Ok(exit) if exit.pid == handle.pid() => return Some(exit),
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                debug!("Exit receiver lagged by {skipped}");
                if handle.has_exited() {
                    return Some(ProcessExit {
                        pid: handle.pid(),
                        code: handle.exit_code(),
                        reason: ExitReason::Exited,
                    });
                }
            }
            Err(RecvError::Closed) => return None,
        }
    }
}
