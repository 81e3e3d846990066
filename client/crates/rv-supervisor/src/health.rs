//! Reachability probing of the backend health endpoint.

use crate::{CancelSignal, HealthStatus, PollOutcome, ServerEndpoint, SupervisorResult};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Probes `<base>/health`. Only HTTP 200 counts as reachable.
pub struct HealthChecker {
    client: reqwest::Client,
    endpoint: ServerEndpoint,
    probe_timeout: Duration,
    status: Arc<RwLock<HealthStatus>>,
    consecutive_failures: AtomicU32,
    last_latency_ms: AtomicU64,
}

impl HealthChecker {
    /// Create a checker whose single probes never exceed `probe_timeout`.
    pub fn new(endpoint: ServerEndpoint, probe_timeout: Duration) -> SupervisorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .pool_max_idle_per_host(1)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            probe_timeout,
            status: Arc::new(RwLock::new(HealthStatus::Unknown)),
            consecutive_failures: AtomicU32::new(0),
            last_latency_ms: AtomicU64::new(0),
        })
    }

    /// Single probe. Network errors, timeouts and non-200 answers are all
    /// "unreachable".
    pub async fn is_reachable(&self) -> bool {
        let reachable = self.probe(self.probe_timeout).await;
        let status = if reachable {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unreachable
        };
        self.set_status(status).await;
        reachable
    }

    /// Probe every `interval` until healthy, `total_timeout` elapses, or the
    /// signal is cancelled.
    ///
    /// Probes are bounded by the remaining budget, so the call returns within
    /// `total_timeout + interval`.
    pub async fn poll_until_healthy(
        &self,
        total_timeout: Duration,
        interval: Duration,
        cancel: &mut CancelSignal,
    ) -> PollOutcome {
        let interval = interval.max(Duration::from_millis(1));
        let deadline = Instant::now() + total_timeout;
        let mut attempts: u32 = 0;

        self.set_status(HealthStatus::Polling).await;
        debug!(
            "Polling {} every {}ms for up to {}ms",
            self.endpoint.health_url(),
            interval.as_millis(),
            total_timeout.as_millis()
        );

        loop {
            if cancel.is_cancelled() {
                return self.cancelled(attempts).await;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let budget = self.probe_timeout.min(remaining.max(interval));
            attempts += 1;

            let reachable = tokio::select! {
                reachable = self.probe(budget) => reachable,
                _ = cancel.cancelled() => return self.cancelled(attempts).await,
            };

            if reachable {
                info!("Backend healthy after {attempts} probe(s)");
                self.set_status(HealthStatus::Healthy).await;
                return PollOutcome::Healthy;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(
                    "Backend not healthy after {attempts} probe(s) in {}ms",
                    total_timeout.as_millis()
                );
                self.set_status(HealthStatus::TimedOut).await;
                return PollOutcome::TimedOut;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval.min(remaining)) => {}
                _ = cancel.cancelled() => return self.cancelled(attempts).await,
            }
        }
    }

    pub async fn status(&self) -> HealthStatus {
        *self.status.read().await
    }

    pub async fn set_status(&self, status: HealthStatus) {
        *self.status.write().await = status;
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn last_latency_ms(&self) -> u64 {
        self.last_latency_ms.load(Ordering::Relaxed)
    }

    async fn probe(&self, budget: Duration) -> bool {
        let start = Instant::now();
        let result = tokio::time::timeout(
            budget,
            self.client.get(self.endpoint.health_url()).send(),
        )
        .await;

        self.last_latency_ms
            .store(start.elapsed().as_millis() as u64, Ordering::Relaxed);

        let reachable = match result {
            Ok(Ok(resp)) if resp.status() == StatusCode::OK => true,
            Ok(Ok(resp)) => {
                debug!("Health probe answered HTTP {}", resp.status());
                false
            }
            Ok(Err(e)) => {
                debug!("Health probe failed: {e}");
                false
            }
            Err(_) => {
                debug!("Health probe timed out after {}ms", budget.as_millis());
                false
            }
        };

        if reachable {
            self.consecutive_failures.store(0, Ordering::Relaxed);
        } else {
            self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        }

        reachable
    }

    async fn cancelled(&self, attempts: u32) -> PollOutcome {
        debug!("Health polling cancelled after {attempts} probe(s)");
        self.set_status(HealthStatus::Unknown).await;
        PollOutcome::Cancelled
    }
}
