//! Per-principal lifecycle: provision, workload hand-off, teardown

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::principal::Principal;
use crate::traits::{ClientError, ErrorKind, ResultSet, WarehouseSession};
use crate::workload::WorkloadStats;

/// The administrative session, shared across lifecycle tasks
///
/// Only account administrators and security administrators can create users
/// by default, so every lifecycle statement goes through this one privileged
/// session; the mutex serializes access to it.
pub type SharedSession = Arc<Mutex<Box<dyn WarehouseSession>>>;

/// Per-principal lifecycle progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    /// Generated in memory but not yet created server-side
    Unprovisioned,
    /// Created, credential set, role granted
    Provisioned,
    /// Running the sample-query loop
    WorkloadRunning,
    /// Workload loop ended cleanly (window elapsed or shutdown)
    Completed,
}

/// Where a principal's lifecycle ended up, reported to the aggregator
#[derive(Debug, Clone)]
pub struct PrincipalOutcome {
    /// Warehouse-side user name
    pub name: String,

    /// Furthest lifecycle state reached
    pub state: LifecycleState,

    /// Workload statistics, when the loop ran
    pub stats: Option<WorkloadStats>,

    /// Classification of the error that ended the lifecycle early
    pub error: Option<ErrorKind>,
}

impl PrincipalOutcome {
    /// Outcome starting in `Unprovisioned`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: LifecycleState::Unprovisioned,
            stats: None,
            error: None,
        }
    }
}

/// Owns the create -> use -> delete transition for ephemeral principals
///
/// All statements run on the shared administrative session; each statement
/// takes the lock exactly once.
pub struct LifecycleManager {
    admin: SharedSession,
}

impl LifecycleManager {
    /// Wrap the administrative session
    pub fn new(admin: SharedSession) -> Self {
        Self { admin }
    }

    async fn run_admin(&self, statement: &str) -> Result<ResultSet, ClientError> {
        let session = self.admin.lock().await;
        session.execute(statement).await
    }

    /// Create the principal if absent, set its credential with a 24-hour
    /// expiry, and grant its role
    ///
    /// A failure aborts this principal's lifecycle but is surfaced to the
    /// caller rather than retried.
    pub async fn provision(&self, principal: &Principal) -> Result<(), ClientError> {
        tracing::info!(user = principal.name(), "creating user");
        self.run_admin(&format!(
            "create user if not exists {}",
            principal.name()
        ))
        .await?;

        tracing::info!(
            user = principal.name(),
            "setting password, user expires in 24 hours"
        );
        // Generated credentials are alphanumeric, so single quoting is safe.
        self.run_admin(&format!(
            "alter user {} set password = '{}' days_to_expiry = 1",
            principal.name(),
            principal.credential()
        ))
        .await?;

        tracing::info!(
            user = principal.name(),
            role = principal.role(),
            "granting role"
        );
        self.run_admin(&format!(
            "grant role {} to user {}",
            principal.role(),
            principal.name()
        ))
        .await?;

        Ok(())
    }

    /// Drop the principal if it exists
    ///
    /// Idempotent server-side; safe to call for principals that were never
    /// provisioned.
    pub async fn teardown(&self, principal: &Principal) -> Result<(), ClientError> {
        tracing::info!(user = principal.name(), "dropping user");
        self.run_admin(&format!("drop user if exists {}", principal.name()))
            .await?;
        Ok(())
    }
}
