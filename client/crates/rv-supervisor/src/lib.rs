mod app_context;
mod cancellation;
mod endpoint;
mod error;
mod health;
mod health_status;
mod initializer;
mod launch_spec;
mod lifecycle;
mod lifecycle_state;
mod process_control;
mod process_handle;
mod progress;
mod readiness;
mod server_status;
mod supervisor;

#[cfg(test)]
mod tests;

pub use app_context::AppContext;
pub use cancellation::{CancelSignal, RunCancellation};
pub use endpoint::ServerEndpoint;
pub use error::{FailureKind, Result as SupervisorResult, SupervisorError};
pub use health::HealthChecker;
pub use health_status::{HealthStatus, PollOutcome};
pub use initializer::{InitializeAck, Initializer};
pub use launch_spec::LaunchSpec;
pub use lifecycle::{ConfigLocator, LaunchSettings, LifecycleController};
pub use lifecycle_state::LifecycleState;
pub use process_control::ProcessControl;
pub use process_handle::{ExitReason, LogLine, OutputStream, ProcessExit, ProcessHandle};
pub use progress::{Notice, ProgressEvent, Stage};
pub use readiness::{ReadinessBroadcaster, Subscription};
pub use server_status::{ServerStatus, build_server_status};
pub use supervisor::{DEFAULT_KILL_GRACE, ProcessSupervisor};
