//! Builder pattern for Orchestrator construction

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AdminCredentials, RunConfig};
use crate::error::{RunError, RunResult};
use crate::traits::WarehouseClient;

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with validated configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .users(5)
///     .duration(Duration::from_secs(30))
///     .client(client)
///     .admin_credentials(credentials)
///     .build()?;
///
/// let summary = orchestrator.run_with_signal_handling().await?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    client: Option<Arc<dyn WarehouseClient>>,
    admin: Option<AdminCredentials>,
    admin_role: String,
}

impl OrchestratorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            client: None,
            admin: None,
            admin_role: "accountadmin".into(),
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of ephemeral principals
    pub fn users(mut self, users: usize) -> Self {
        self.config.users = users;
        self
    }

    /// Set the workload duration per principal
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Set the warehouse client
    pub fn client(mut self, client: Arc<dyn WarehouseClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the administrative credentials
    pub fn admin_credentials(mut self, credentials: AdminCredentials) -> Self {
        self.admin = Some(credentials);
        self
    }

    /// Set the role used for the administrative connection
    pub fn admin_role(mut self, role: impl Into<String>) -> Self {
        self.admin_role = role.into();
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the client or admin credentials are not set, or if
    /// configuration validation fails.
    pub fn build(self) -> RunResult<Orchestrator> {
        let client = self
            .client
            .ok_or_else(|| RunError::missing_config("client"))?;

        let admin = self
            .admin
            .ok_or_else(|| RunError::missing_config("admin_credentials"))?;

        self.config
            .validate()
            .map_err(|e| RunError::config(e.to_string()))?;

        Ok(Orchestrator::new(
            self.config,
            client,
            admin,
            self.admin_role,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
