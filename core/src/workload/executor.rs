//! Workload execution loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::TargetConfig;
use crate::principal::Principal;
use crate::traits::{ClientError, ConnectParams, WarehouseClient, WarehouseSession};

use super::stats::WorkloadStats;

/// Disables cached-result reuse so each iteration measures real execution cost
const DISABLE_RESULT_CACHE: &str = "alter session set use_cached_result = false";

/// WorkloadRunner executes the sample query in a loop: connect -> disable
/// cache -> execute -> repeat, until the workload window elapses.
///
/// Each runner owns a dedicated session opened with its principal's own
/// credential; the session is closed on every exit path, including shutdown
/// and query failure.
pub struct WorkloadRunner {
    /// Worker identifier, used for log correlation
    id: usize,

    /// The principal whose credential opens the session
    principal: Principal,

    /// Warehouse client (shared across workers via Arc)
    client: Arc<dyn WarehouseClient>,

    /// Query target (warehouse/database/schema and the sample query)
    target: TargetConfig,

    /// Workload window length
    window: Duration,
}

impl WorkloadRunner {
    /// Create a new runner
    pub fn new(
        id: usize,
        principal: Principal,
        client: Arc<dyn WarehouseClient>,
        target: TargetConfig,
        window: Duration,
    ) -> Self {
        Self {
            id,
            principal,
            client,
            target,
            window,
        }
    }

    /// Run the workload loop
    ///
    /// Returns the loop's statistics when the window elapses or shutdown is
    /// signalled. A connect or query error ends the loop early and propagates
    /// after the session has been closed.
    pub async fn run(
        self,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<WorkloadStats, ClientError> {
        let params = ConnectParams::new(self.principal.name(), self.principal.credential())
            .with_role(self.principal.role())
            .with_warehouse(&self.target.warehouse)
            .with_database(&self.target.database)
            .with_schema(&self.target.schema);

        tracing::info!(
            worker_id = self.id,
            user = self.principal.name(),
            "connecting workload session"
        );
        let mut session = self.client.connect(&params).await?;

        let result = self.drive(session.as_ref(), &mut shutdown).await;

        if let Err(e) = session.close().await {
            tracing::warn!(
                worker_id = self.id,
                user = self.principal.name(),
                error = %e,
                "failed to close workload session"
            );
        }

        result
    }

    /// The query loop proper; the caller owns session close
    async fn drive(
        &self,
        session: &dyn WarehouseSession,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<WorkloadStats, ClientError> {
        session.execute(DISABLE_RESULT_CACHE).await?;

        let mut stats = WorkloadStats::new();
        stats.start();
        let deadline = Instant::now() + self.window;

        tracing::info!(
            worker_id = self.id,
            user = self.principal.name(),
            seconds = self.window.as_secs_f64(),
            "running sample query until the window elapses"
        );

        loop {
            // Deadline is checked before each iteration, so the loop ends
            // within one query latency of the window and never before it.
            if Instant::now() >= deadline {
                break;
            }

            let query_start = Instant::now();

            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::debug!(
                        worker_id = self.id,
                        user = self.principal.name(),
                        "workload received shutdown signal"
                    );
                    break;
                }

                result = session.execute(&self.target.query) => {
                    match result {
                        Ok(rows) => {
                            let latency = query_start.elapsed();
                            stats.record_query(latency);
                            tracing::info!(
                                worker_id = self.id,
                                user = self.principal.name(),
                                rows = rows.row_count(),
                                latency_secs = latency.as_secs_f64(),
                                "query done"
                            );
                        }
                        Err(e) => {
                            stats.record_error();
                            stats.stop();
                            // No retries: a query failure ends this
                            // principal's workload early.
                            tracing::warn!(
                                worker_id = self.id,
                                user = self.principal.name(),
                                completed = stats.completed,
                                error = %e,
                                "query failed, ending workload early"
                            );
                            return Err(e);
                        }
                    }
                }
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            user = self.principal.name(),
            completed = stats.completed,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "workload finished"
        );

        Ok(stats)
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for WorkloadRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadRunner")
            .field("id", &self.id)
            .field("user", &self.principal.name())
            .field("account", &self.client.account())
            .field("window", &self.window)
            .finish()
    }
}
