//! Orchestrator execution logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex};

use crate::config::{AdminCredentials, RunConfig, TargetConfig};
use crate::credential::generate_password;
use crate::error::{RunError, RunResult};
use crate::principal::Principal;
use crate::traits::{ConnectParams, WarehouseClient, WarehouseSession};
use crate::workload::WorkloadRunner;

use super::aggregator::{summarize_outcomes, RunSummary};
use super::lifecycle::{LifecycleManager, LifecycleState, PrincipalOutcome, SharedSession};

/// Orchestrator manages the load-test lifecycle
///
/// Responsible for generating principals, fanning out one lifecycle task per
/// principal, coordinating graceful shutdown, and guaranteeing the teardown
/// pass runs for every generated principal before the administrative session
/// is released.
pub struct Orchestrator {
    /// Run configuration
    pub(crate) config: RunConfig,

    /// Warehouse client (shared across workers)
    pub(crate) client: Arc<dyn WarehouseClient>,

    /// Credentials for the privileged administrative connection
    pub(crate) admin: AdminCredentials,

    /// Role used for the administrative connection
    pub(crate) admin_role: String,

    /// Shutdown signal sender
    pub(crate) shutdown_tx: broadcast::Sender<()>,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a more ergonomic construction.
    pub fn new(
        config: RunConfig,
        client: Arc<dyn WarehouseClient>,
        admin: AdminCredentials,
        admin_role: String,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            client,
            admin,
            admin_role,
            shutdown_tx,
        }
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Ask outstanding workers to terminate
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the load test
    ///
    /// Generates N principals, runs provision -> workload for each
    /// concurrently, then unconditionally tears every principal down. A
    /// failed administrative connection is returned as the run's error after
    /// the (no-op) teardown pass has been logged.
    pub async fn run(&self) -> RunResult<RunSummary> {
        let start = Instant::now();
        let started_at = chrono::Utc::now();

        let principals: Vec<Principal> = (0..self.config.users)
            .map(|i| {
                Principal::with_ordinal(
                    &self.config.user_prefix,
                    i,
                    generate_password(self.config.password_length),
                    &self.config.workload_role,
                )
            })
            .collect();

        tracing::info!(
            users = self.config.users,
            seconds = self.config.duration.as_secs_f64(),
            account = self.client.account(),
            "starting load test"
        );

        let admin_params = ConnectParams::new(&self.admin.user, &self.admin.password)
            .with_role(&self.admin_role);

        let (admin_session, connect_error) = match self.client.connect(&admin_params).await {
            Ok(session) => (Some(Arc::new(Mutex::new(session))), None),
            Err(e) => {
                tracing::error!(error = %e, "administrative connection failed");
                (None, Some(e))
            }
        };

        let outcomes = match &admin_session {
            Some(admin) => self.run_workers(admin, &principals).await,
            None => principals
                .iter()
                .map(|p| PrincipalOutcome::new(p.name()))
                .collect(),
        };

        // Cleanup phase: teardown runs for every generated principal, no
        // matter how the workers ended.
        let torn_down = self.teardown_all(admin_session.as_ref(), &principals).await;

        if let Some(admin) = admin_session {
            let mut session = admin.lock().await;
            if let Err(e) = session.close().await {
                tracing::warn!(error = %e, "failed to close administrative session");
            }
        }

        let summary = summarize_outcomes(&outcomes, torn_down, started_at, start.elapsed());
        tracing::info!(
            elapsed_secs = summary.elapsed.as_secs_f64(),
            provisioned = summary.provisioned,
            torn_down = summary.torn_down,
            total_queries = summary.total_queries,
            query_errors = summary.query_errors,
            qps = summary.queries_per_second(),
            "load test finished"
        );

        match connect_error {
            Some(e) => Err(RunError::Client(e)),
            None => Ok(summary),
        }
    }

    /// Spawn one lifecycle task per principal and collect their outcomes
    async fn run_workers(
        &self,
        admin: &SharedSession,
        principals: &[Principal],
    ) -> Vec<PrincipalOutcome> {
        let lifecycle = Arc::new(LifecycleManager::new(Arc::clone(admin)));
        let mut handles = Vec::with_capacity(principals.len());

        for (id, principal) in principals.iter().cloned().enumerate() {
            let lifecycle = Arc::clone(&lifecycle);
            let client = Arc::clone(&self.client);
            let target = self.config.target.clone();
            let window = self.config.duration;
            let shutdown_rx = self.shutdown_tx.subscribe();

            handles.push(tokio::spawn(run_lifecycle(
                id,
                principal,
                lifecycle,
                client,
                target,
                window,
                shutdown_rx,
            )));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(worker_id = id, error = %e, "worker task panicked");
                    outcomes.push(PrincipalOutcome::new(principals[id].name()));
                }
            }
        }
        outcomes
    }

    /// Drop every generated principal, one concurrent task per principal
    ///
    /// Teardown errors are logged, never re-raised: the pass must run to
    /// completion for all principals. Returns the number of successful drops.
    async fn teardown_all(
        &self,
        admin: Option<&SharedSession>,
        principals: &[Principal],
    ) -> usize {
        let Some(admin) = admin else {
            for principal in principals {
                tracing::warn!(
                    user = principal.name(),
                    "no administrative session, skipping drop"
                );
            }
            return 0;
        };

        let lifecycle = Arc::new(LifecycleManager::new(Arc::clone(admin)));
        let mut handles = Vec::with_capacity(principals.len());

        for principal in principals.iter().cloned() {
            let lifecycle = Arc::clone(&lifecycle);
            handles.push(tokio::spawn(async move {
                match lifecycle.teardown(&principal).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(
                            user = principal.name(),
                            error = %e,
                            "failed to drop user"
                        );
                        false
                    }
                }
            }));
        }

        let mut torn_down = 0;
        for handle in handles {
            match handle.await {
                Ok(true) => torn_down += 1,
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, "teardown task panicked"),
            }
        }
        torn_down
    }

    /// Run with Ctrl+C signal handling
    ///
    /// An interrupt broadcasts shutdown to all workers; the teardown pass
    /// still runs and the run completes normally.
    pub async fn run_with_signal_handling(&self) -> RunResult<RunSummary> {
        let shutdown_tx = self.shutdown_tx.clone();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!(
                        "caught interrupt, terminating workers and cleaning up, please wait..."
                    );
                    let _ = shutdown_tx.send(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to listen for interrupt");
                }
            }
        });

        let result = self.run().await;

        signal_handle.abort();

        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("account", &self.client.account())
            .field("admin_role", &self.admin_role)
            .finish()
    }
}

/// One principal's provision -> workload lifecycle, run as a spawned task
async fn run_lifecycle(
    id: usize,
    principal: Principal,
    lifecycle: Arc<LifecycleManager>,
    client: Arc<dyn WarehouseClient>,
    target: TargetConfig,
    window: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> PrincipalOutcome {
    let mut outcome = PrincipalOutcome::new(principal.name());

    tokio::select! {
        biased;

        _ = shutdown.recv() => {
            tracing::debug!(
                worker_id = id,
                user = principal.name(),
                "cancelled before provisioning finished"
            );
            return outcome;
        }

        result = lifecycle.provision(&principal) => {
            if let Err(e) = result {
                tracing::error!(
                    worker_id = id,
                    user = principal.name(),
                    error = %e,
                    "provisioning failed"
                );
                outcome.error = Some(e.kind());
                return outcome;
            }
        }
    }
    outcome.state = LifecycleState::Provisioned;

    let runner = WorkloadRunner::new(id, principal.clone(), client, target, window);
    outcome.state = LifecycleState::WorkloadRunning;

    match runner.run(shutdown).await {
        Ok(stats) => {
            outcome.state = LifecycleState::Completed;
            outcome.stats = Some(stats);
        }
        Err(e) => {
            outcome.error = Some(e.kind());
        }
    }

    outcome
}
