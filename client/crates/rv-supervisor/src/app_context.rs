//! Application-wide wiring of the supervision components.

use crate::{
    HealthChecker, Initializer, LaunchSettings, LaunchSpec, LifecycleController, LogLine,
    ProcessSupervisor, ReadinessBroadcaster, ServerEndpoint, ServerStatus, SupervisorResult,
};

use std::path::PathBuf;
use std::sync::Arc;

use rv_config::{Config, LintConfigDiscovery};
use tokio::sync::broadcast;
use tracing::info;

/// Holds the supervisor, controller and readiness flag for the lifetime of
/// the host. Create once at startup and pass by reference to whatever issues
/// start and restart commands.
pub struct AppContext {
    supervisor: Arc<ProcessSupervisor>,
    readiness: Arc<ReadinessBroadcaster>,
    controller: Arc<LifecycleController>,
}

impl AppContext {
    pub fn from_config(config: &Config) -> SupervisorResult<Self> {
        let endpoint = ServerEndpoint::parse(&config.endpoint.base_url)?;

        let supervisor = Arc::new(ProcessSupervisor::new(config.startup.kill_grace()));
        let readiness = Arc::new(ReadinessBroadcaster::new());
        let health = Arc::new(HealthChecker::new(
            endpoint.clone(),
            config.startup.probe_timeout(),
        )?);
        let initializer = Arc::new(Initializer::new(
            endpoint,
            config.startup.initialize_timeout(),
        )?);

        let mut launch = LaunchSpec::new(&config.backend.program).args(config.backend.args.clone());
        if let Some(dir) = config.backend_working_dir() {
            launch = launch.working_dir(dir);
        }

        let settings = LaunchSettings {
            launch,
            project_root: config.project.root_dir.clone(),
            startup_timeout: config.startup.startup_timeout(),
            poll_interval: config.startup.poll_interval(),
        };

        let mut controller = LifecycleController::new(
            settings,
            supervisor.clone(),
            health,
            initializer,
            readiness.clone(),
        );

        if let Some(root) = config.project.root_dir.clone() {
            controller = controller.with_config_locator(lint_config_locator(root));
        }

        Ok(Self {
            supervisor,
            readiness,
            controller: Arc::new(controller),
        })
    }

    pub fn controller(&self) -> &Arc<LifecycleController> {
        &self.controller
    }

    pub fn readiness(&self) -> &Arc<ReadinessBroadcaster> {
        &self.readiness
    }

    pub fn supervisor(&self) -> &Arc<ProcessSupervisor> {
        &self.supervisor
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogLine> {
        self.supervisor.subscribe_logs()
    }

    pub async fn start(&self) -> SupervisorResult<()> {
        self.controller.start().await
    }

    pub async fn restart(&self) -> SupervisorResult<()> {
        self.controller.restart().await
    }

    pub async fn status(&self) -> ServerStatus {
        self.controller.status().await
    }

    /// Status after a fresh health probe.
    pub async fn probe_status(&self) -> ServerStatus {
        self.controller.probe().await;
        self.controller.status().await
    }

    /// Stop the backend when the host shuts down.
    pub async fn shutdown(&self) {
        info!("Shutting down backend supervision");
        self.controller.stop().await;
    }
}

fn lint_config_locator(root: PathBuf) -> crate::ConfigLocator {
    Arc::new(move || LintConfigDiscovery::new(root.clone()).find())
}
