use crate::{LaunchSpec, ProcessExit, ProcessHandle, SupervisorResult};

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Process ownership seam used by the lifecycle controller.
///
/// At most one process is live per implementation. `kill` must be
/// idempotent and safe to call when nothing is running.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Start a process, terminating any previous live one first.
    async fn spawn(&self, spec: &LaunchSpec) -> SupervisorResult<ProcessHandle>;

    /// Terminate the live process, if any, and wait for it to exit.
    async fn kill(&self);

    /// Last known liveness; never blocks on the OS.
    fn is_alive(&self) -> bool;

    fn current(&self) -> Option<ProcessHandle>;

    /// Exit notifications for every process this implementation starts.
    fn subscribe_exits(&self) -> broadcast::Receiver<ProcessExit>;
}
