//! Ownership of the backend child process.

use crate::{
    ExitReason, LaunchSpec, LogLine, OutputStream, ProcessControl, ProcessExit, ProcessHandle,
    SupervisorError, SupervisorResult,
};

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const EXIT_CHANNEL_CAPACITY: usize = 16;
const LOG_CHANNEL_CAPACITY: usize = 1024;
const BACKEND_LOG_TARGET: &str = "backend";

pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

type Slot = Arc<Mutex<Option<LiveProcess>>>;

struct LiveProcess {
    handle: ProcessHandle,
    kill_tx: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

/// Starts, watches and terminates the backend process.
///
/// A watcher task owns each child. It is the only place a termination is
/// recorded, so the exit notification fires once whether the process
/// crashed or was killed.
pub struct ProcessSupervisor {
    current: Slot,
    op_lock: AsyncMutex<()>,
    kill_grace: Duration,
    exit_tx: broadcast::Sender<ProcessExit>,
    log_tx: broadcast::Sender<LogLine>,
}

impl ProcessSupervisor {
    pub fn new(kill_grace: Duration) -> Self {
        let (exit_tx, _) = broadcast::channel(EXIT_CHANNEL_CAPACITY);
        let (log_tx, _) = broadcast::channel(LOG_CHANNEL_CAPACITY);

        Self {
            current: Arc::new(Mutex::new(None)),
            op_lock: AsyncMutex::new(()),
            kill_grace,
            exit_tx,
            log_tx,
        }
    }

    pub async fn spawn(&self, spec: &LaunchSpec) -> SupervisorResult<ProcessHandle> {
        let _op = self.op_lock.lock().await;

        let previous = lock_slot(&self.current).take();
        if let Some(previous) = previous {
            warn!(
                "Replacing live backend process (PID {})",
                previous.handle.pid()
            );
            terminate(previous).await;
        }

        info!("Spawning backend: {}", spec.display_command());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| SupervisorError::spawn(&spec.program, e))?;

        let Some(pid) = child.id() else {
            let code = child.try_wait().ok().flatten().and_then(|s| s.code());
            return Err(SupervisorError::exited_before_healthy(code));
        };

        let handle = ProcessHandle::new(pid, spec.program.display().to_string());

        if let Some(stdout) = child.stdout.take() {
            self.forward_output(pid, OutputStream::Stdout, stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            self.forward_output(pid, OutputStream::Stderr, stderr);
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let watcher = tokio::spawn(watch_process(
            child,
            handle.clone(),
            kill_rx,
            self.kill_grace,
            self.exit_tx.clone(),
            self.current.clone(),
        ));

        // The watcher finalizes before it clears the slot, so an already
        // exited process is never stored as live.
        {
            let mut slot = lock_slot(&self.current);
            if !handle.has_exited() {
                *slot = Some(LiveProcess {
                    handle: handle.clone(),
                    kill_tx,
                    watcher,
                });
            }
        }

        info!("Backend started with PID {pid}");
        Ok(handle)
    }

    pub async fn kill(&self) {
        let _op = self.op_lock.lock().await;

        let live = lock_slot(&self.current).take();
        match live {
            Some(live) => {
                info!("Stopping backend process (PID {})", live.handle.pid());
                terminate(live).await;
            }
            None => debug!("Kill requested with no live backend process"),
        }
    }

    pub fn is_alive(&self) -> bool {
        lock_slot(&self.current)
            .as_ref()
            .is_some_and(|live| live.handle.is_alive())
    }

    pub fn current(&self) -> Option<ProcessHandle> {
        lock_slot(&self.current)
            .as_ref()
            .map(|live| live.handle.clone())
    }

    pub fn subscribe_exits(&self) -> broadcast::Receiver<ProcessExit> {
        self.exit_tx.subscribe()
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogLine> {
        self.log_tx.subscribe()
    }

    fn forward_output<R>(&self, pid: u32, stream: OutputStream, reader: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let log_tx = self.log_tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        info!(target: BACKEND_LOG_TARGET, pid, %stream, "{line}");
                        let _ = log_tx.send(LogLine { pid, stream, line });
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!("Backend {stream} reader for PID {pid} stopped: {e}");
                        break;
                    }
                }
            }
        });
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_KILL_GRACE)
    }
}

#[async_trait]
impl ProcessControl for ProcessSupervisor {
    async fn spawn(&self, spec: &LaunchSpec) -> SupervisorResult<ProcessHandle> {
        ProcessSupervisor::spawn(self, spec).await
    }

    async fn kill(&self) {
        ProcessSupervisor::kill(self).await
    }

    fn is_alive(&self) -> bool {
        ProcessSupervisor::is_alive(self)
    }

    fn current(&self) -> Option<ProcessHandle> {
        ProcessSupervisor::current(self)
    }

    fn subscribe_exits(&self) -> broadcast::Receiver<ProcessExit> {
        ProcessSupervisor::subscribe_exits(self)
    }
}

fn lock_slot(slot: &Slot) -> MutexGuard<'_, Option<LiveProcess>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn terminate(live: LiveProcess) {
    let pid = live.handle.pid();
    if live.kill_tx.send(()).is_err() {
        debug!("Backend PID {pid} already exiting");
    }
    if let Err(e) = live.watcher.await {
        error!("Watcher for backend PID {pid} failed: {e}");
    }
}

async fn watch_process(
    mut child: Child,
    handle: ProcessHandle,
    mut kill_rx: oneshot::Receiver<()>,
    kill_grace: Duration,
    exit_tx: broadcast::Sender<ProcessExit>,
    current: Slot,
) {
    let pid = handle.pid();

    // A dropped sender counts as a kill request.
    let (status, reason) = tokio::select! {
        status = child.wait() => (status, ExitReason::Exited),
        _ = &mut kill_rx => (stop_child(&mut child, pid, kill_grace).await, ExitReason::Killed),
    };

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!("Failed to collect exit status of backend PID {pid}: {e}");
            None
        }
    };

    if !handle.finalize(code) {
        return;
    }

    {
        let mut slot = lock_slot(&current);
        if slot.as_ref().is_some_and(|live| live.handle.pid() == pid) {
            slot.take();
        }
    }

    match reason {
        ExitReason::Exited => warn!("Backend process {pid} exited with code {code:?}"),
        ExitReason::Killed => info!("Backend process {pid} stopped"),
    }

    let _ = exit_tx.send(ProcessExit { pid, code, reason });
}

#[cfg_attr(not(unix), allow(unused_variables))]
async fn stop_child(child: &mut Child, pid: u32, grace: Duration) -> std::io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        debug!("Sending SIGTERM to backend PID {pid}");
        if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
            if let Ok(status) = tokio::time::timeout(grace, child.wait()).await {
                return status;
            }
            warn!(
                "Backend PID {pid} still running {}ms after SIGTERM, sending SIGKILL",
                grace.as_millis()
            );
        }
    }

    child.kill().await?;
    child.wait().await
}
