//! Integration tests for the orchestrator

use super::*;
use crate::config::{AdminCredentials, RunConfig};
use crate::error::RunError;
use crate::traits::{ClientError, ConnectParams, ResultSet, WarehouseClient, WarehouseSession};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock client and session
// ============================================================================

/// Statement-classifying ledger shared between a mock client and its sessions
#[derive(Default)]
struct Ledger {
    connects: AtomicUsize,
    closes: AtomicUsize,
    creates: AtomicUsize,
    alters: AtomicUsize,
    grants: AtomicUsize,
    drops: AtomicUsize,
    queries: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

struct MockWarehouseClient {
    ledger: Arc<Ledger>,
    query_delay: Option<Duration>,
    fail_admin_connect: bool,
    fail_create_containing: Option<String>,
    fail_queries: bool,
}

impl MockWarehouseClient {
    fn new() -> Self {
        Self {
            ledger: Arc::new(Ledger::default()),
            query_delay: None,
            fail_admin_connect: false,
            fail_create_containing: None,
            fail_queries: false,
        }
    }

    fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    fn with_fail_admin_connect(mut self) -> Self {
        self.fail_admin_connect = true;
        self
    }

    /// Reject create statements that mention the given user name
    fn with_fail_create_containing(mut self, name: &str) -> Self {
        self.fail_create_containing = Some(name.to_string());
        self
    }

    fn with_fail_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }
}

#[async_trait]
impl WarehouseClient for MockWarehouseClient {
    fn account(&self) -> &str {
        "mock-account"
    }

    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn WarehouseSession>, ClientError> {
        let is_admin = params.role.as_deref() == Some("accountadmin");
        if self.fail_admin_connect && is_admin {
            return Err(ClientError::Auth("incorrect username or password".into()));
        }
        self.ledger.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            ledger: Arc::clone(&self.ledger),
            query_delay: self.query_delay,
            fail_create_containing: self.fail_create_containing.clone(),
            fail_queries: self.fail_queries,
        }))
    }
}

struct MockSession {
    ledger: Arc<Ledger>,
    query_delay: Option<Duration>,
    fail_create_containing: Option<String>,
    fail_queries: bool,
}

#[async_trait]
impl WarehouseSession for MockSession {
    async fn execute(&self, statement: &str) -> Result<ResultSet, ClientError> {
        self.ledger
            .statements
            .lock()
            .unwrap()
            .push(statement.to_string());

        if statement.starts_with("create user") {
            self.ledger.creates.fetch_add(1, Ordering::SeqCst);
            if let Some(name) = &self.fail_create_containing {
                if statement.contains(name.as_str()) {
                    return Err(ClientError::Privilege(
                        "insufficient privileges to create user".into(),
                    ));
                }
            }
            return Ok(ResultSet::empty());
        }
        if statement.starts_with("alter user") {
            self.ledger.alters.fetch_add(1, Ordering::SeqCst);
            return Ok(ResultSet::empty());
        }
        if statement.starts_with("grant role") {
            self.ledger.grants.fetch_add(1, Ordering::SeqCst);
            return Ok(ResultSet::empty());
        }
        if statement.starts_with("drop user") {
            self.ledger.drops.fetch_add(1, Ordering::SeqCst);
            return Ok(ResultSet::empty());
        }
        if statement.starts_with("alter session") {
            return Ok(ResultSet::empty());
        }

        // Everything else is a sample query
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        self.ledger.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(ClientError::query("simulated query failure"));
        }
        Ok(ResultSet {
            rows: vec![vec![serde_json::Value::from(1)]],
        })
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.ledger.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn admin_credentials() -> AdminCredentials {
    AdminCredentials {
        account: "mock-account".into(),
        user: "admin".into(),
        password: "hunter2".into(),
    }
}

fn build_orchestrator(
    client: Arc<dyn WarehouseClient>,
    users: usize,
    duration: Duration,
) -> Orchestrator {
    OrchestratorBuilder::new()
        .config(RunConfig::new(users, duration))
        .client(client)
        .admin_credentials(admin_credentials())
        .build()
        .expect("failed to build orchestrator")
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_provisions_and_tears_down_every_principal() {
    let client = Arc::new(MockWarehouseClient::new());
    let ledger = client.ledger();
    let orchestrator = build_orchestrator(client, 3, Duration::ZERO);

    let summary = orchestrator.run().await.expect("run failed");

    assert_eq!(ledger.creates.load(Ordering::SeqCst), 3);
    assert_eq!(ledger.alters.load(Ordering::SeqCst), 3);
    assert_eq!(ledger.grants.load(Ordering::SeqCst), 3);
    assert_eq!(ledger.drops.load(Ordering::SeqCst), 3);

    assert_eq!(summary.total_principals, 3);
    assert_eq!(summary.provisioned, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.torn_down, 3);
    // A zero-second window runs zero queries
    assert_eq!(summary.total_queries, 0);
}

#[tokio::test]
async fn test_provision_failure_does_not_block_siblings() {
    let client = Arc::new(
        MockWarehouseClient::new()
            .with_query_delay(Duration::from_millis(5))
            .with_fail_create_containing("concurrent_2"),
    );
    let ledger = client.ledger();
    let orchestrator = build_orchestrator(client, 3, Duration::from_millis(30));

    let summary = orchestrator.run().await.expect("run failed");

    // All three create statements were attempted, all three users dropped
    assert_eq!(ledger.creates.load(Ordering::SeqCst), 3);
    assert_eq!(ledger.drops.load(Ordering::SeqCst), 3);

    assert_eq!(summary.provisioned, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.torn_down, 3);
}

#[tokio::test]
async fn test_admin_connect_failure_exits_with_error() {
    let client = Arc::new(MockWarehouseClient::new().with_fail_admin_connect());
    let ledger = client.ledger();
    let orchestrator = build_orchestrator(client, 3, Duration::from_secs(1));

    let result = orchestrator.run().await;

    assert!(matches!(
        result,
        Err(RunError::Client(ClientError::Auth(_)))
    ));
    // No session was ever opened, so provisioning and drops are no-ops
    assert_eq!(ledger.connects.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.creates.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.drops.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_interrupt_mid_workload_tears_down_all() {
    let client = Arc::new(MockWarehouseClient::new().with_query_delay(Duration::from_millis(50)));
    let ledger = client.ledger();
    let orchestrator = Arc::new(build_orchestrator(client, 5, Duration::from_secs(30)));

    let handle = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run().await }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    orchestrator.shutdown();

    let start = std::time::Instant::now();
    let summary = handle
        .await
        .expect("run task panicked")
        .expect("run failed");

    // Shutdown ended the run long before the 30 second window
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.total_principals, 5);
    assert_eq!(ledger.drops.load(Ordering::SeqCst), 5);
    assert_eq!(summary.torn_down, 5);
}

#[tokio::test]
async fn test_workload_errors_are_reported_not_fatal() {
    let client = Arc::new(MockWarehouseClient::new().with_fail_queries());
    let ledger = client.ledger();
    let orchestrator = build_orchestrator(client, 2, Duration::from_secs(30));

    let start = std::time::Instant::now();
    let summary = orchestrator.run().await.expect("run failed");

    // Query failures end each workload early instead of running the window out
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.provisioned, 2);
    assert_eq!(ledger.drops.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_admin_session_closed_after_run() {
    let client = Arc::new(MockWarehouseClient::new());
    let ledger = client.ledger();
    let orchestrator = build_orchestrator(client, 1, Duration::ZERO);

    orchestrator.run().await.expect("run failed");

    // One admin session + one workload session, both closed
    assert_eq!(ledger.connects.load(Ordering::SeqCst), 2);
    assert_eq!(ledger.closes.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Builder tests
// ============================================================================

#[tokio::test]
async fn test_builder_missing_client() {
    let result = OrchestratorBuilder::new()
        .admin_credentials(admin_credentials())
        .build();

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("client"));
}

#[tokio::test]
async fn test_builder_missing_admin_credentials() {
    let client: Arc<dyn WarehouseClient> = Arc::new(MockWarehouseClient::new());
    let result = OrchestratorBuilder::new().client(client).build();

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("admin_credentials"));
}

#[tokio::test]
async fn test_builder_rejects_zero_users() {
    let client: Arc<dyn WarehouseClient> = Arc::new(MockWarehouseClient::new());
    let result = OrchestratorBuilder::new()
        .client(client)
        .admin_credentials(admin_credentials())
        .users(0)
        .build();

    assert!(matches!(result, Err(RunError::Config(_))));
}
