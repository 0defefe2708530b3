//! Core traits for warehouse clients and sessions
//!
//! These traits are defined in core so orchestration never depends on a
//! concrete driver. The production implementation lives in the connector
//! crate; tests substitute mocks.

use async_trait::async_trait;
use serde_json::Value;

// ============================================================================
// Connection parameters
// ============================================================================

/// Parameters for opening an authenticated warehouse session
#[derive(Clone)]
pub struct ConnectParams {
    /// Login name
    pub user: String,

    /// Login secret
    pub password: String,

    /// Session role (e.g. "readonly", "accountadmin")
    pub role: Option<String>,

    /// Virtual warehouse that executes this session's queries
    pub warehouse: Option<String>,

    /// Default database for unqualified names
    pub database: Option<String>,

    /// Default schema, passed through with its exact case
    pub schema: Option<String>,
}

impl ConnectParams {
    /// Minimal parameters: user and password only
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            role: None,
            warehouse: None,
            database: None,
            schema: None,
        }
    }

    /// Set the session role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the virtual warehouse
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    /// Set the default database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the default schema
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

impl std::fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectParams")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}

// ============================================================================
// Result sets
// ============================================================================

/// Rows returned by a statement
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Row-major JSON-typed cells
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Empty result set, as returned by DDL statements
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First cell of the first row, for single-scalar queries
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// First cell of the first row rendered as text
    ///
    /// String cells are returned without surrounding quotes; other JSON
    /// values use their canonical rendering.
    pub fn scalar_text(&self) -> Option<String> {
        self.scalar().map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

// ============================================================================
// Client traits
// ============================================================================

/// Factory for authenticated warehouse sessions
///
/// One client targets one account. Implementations handle transport and
/// authentication details while presenting a uniform interface to the
/// orchestrator and workload runner.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Account identifier this client targets
    fn account(&self) -> &str;

    /// Open an authenticated session
    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn WarehouseSession>, ClientError>;
}

/// A live authenticated session
#[async_trait]
pub trait WarehouseSession: Send + Sync {
    /// Execute one SQL statement and return its rows
    async fn execute(&self, statement: &str) -> Result<ResultSet, ClientError>;

    /// Close the session. Must be idempotent.
    async fn close(&mut self) -> Result<(), ClientError>;
}

// ============================================================================
// Error taxonomy
// ============================================================================

/// Warehouse client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Bad or expired credential
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Session role lacks a required privilege
    #[error("insufficient privilege: {0}")]
    Privilege(String),

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Statement rejected or failed server-side
    #[error("query failed: {message}")]
    Query {
        /// Server-reported error code, when present
        code: Option<String>,
        /// Server-reported message
        message: String,
    },
}

impl ClientError {
    /// Build a `Query` error without a server code
    pub fn query(message: impl Into<String>) -> Self {
        ClientError::Query {
            code: None,
            message: message.into(),
        }
    }

    /// Classify for summary counting
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::Privilege(_) => ErrorKind::Privilege,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Query { .. } => ErrorKind::Query,
        }
    }
}

/// Coarse error classification used in run summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or expired credential
    Auth,
    /// Insufficient role
    Privilege,
    /// Transient connectivity failure
    Network,
    /// Malformed or runtime query failure
    Query,
}
