use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Read-only view of a backend process owned by the supervisor.
///
/// Clones share the same underlying state, so liveness observed through any
/// clone reflects the supervisor's last knowledge of the process.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    inner: Arc<HandleState>,
}

#[derive(Debug)]
struct HandleState {
    pid: u32,
    program: String,
    started_at: Instant,
    alive: AtomicBool,
    finalized: AtomicBool,
    exit_code: OnceLock<Option<i32>>,
}

impl ProcessHandle {
    pub(crate) fn new(pid: u32, program: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HandleState {
                pid,
                program: program.into(),
                started_at: Instant::now(),
                alive: AtomicBool::new(true),
                finalized: AtomicBool::new(false),
                exit_code: OnceLock::new(),
            }),
        }
    }

    pub fn pid(&self) -> u32 {
        self.inner.pid
    }

    pub fn program(&self) -> &str {
        &self.inner.program
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    pub fn has_exited(&self) -> bool {
        self.inner.finalized.load(Ordering::SeqCst)
    }

    /// Exit code; `None` while running or when terminated by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.inner.exit_code.get().copied().flatten()
    }

    /// Record termination. Only the first call wins and returns true.
    pub(crate) fn finalize(&self, code: Option<i32>) -> bool {
        if self.inner.finalized.swap(true, Ordering::SeqCst) {
            return false;
        }
        let _ = self.inner.exit_code.set(code);
        self.inner.alive.store(false, Ordering::SeqCst);
        true
    }
}

/// Why a supervised process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Crash, signal from elsewhere, or self-exit
    Exited,
    /// Explicit kill through the supervisor
    Killed,
}

/// Exit notification, delivered exactly once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    pub pid: u32,
    pub code: Option<i32>,
    pub reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// One line of backend output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub pid: u32,
    pub stream: OutputStream,
    pub line: String,
}
