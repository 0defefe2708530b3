//! Run configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Administrative credentials for the privileged connection
///
/// Supplied by the caller at startup; this crate never reads credential
/// storage itself.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    /// Account identifier
    pub account: String,

    /// Administrative login name
    pub user: String,

    /// Administrative login secret
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fixed query target for the workload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Virtual warehouse that executes the sample query
    pub warehouse: String,

    /// Database holding the sample data
    pub database: String,

    /// Schema holding the sample data; case is preserved exactly
    pub schema: String,

    /// The sample query each principal runs in a loop
    pub query: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            warehouse: "xsmall".into(),
            database: "SNOWFLAKE_SAMPLE_DATA".into(),
            schema: "TPCDS_SF10TCL".into(),
            query: "select * from store_sales limit 100000".into(),
        }
    }
}

/// Load-test run configuration
///
/// Defines how many ephemeral principals to create, how long each one runs
/// the sample query, and what the query targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of ephemeral principals
    pub users: usize,

    /// Workload duration per principal
    pub duration: Duration,

    /// Prefix for generated principal names ("<prefix>_<i+1>")
    pub user_prefix: String,

    /// Target length for generated credentials
    pub password_length: usize,

    /// Role granted to each principal and assumed by its workload session
    pub workload_role: String,

    /// Query target
    pub target: TargetConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            users: 3,
            duration: Duration::from_secs(10),
            user_prefix: "concurrent".into(),
            password_length: 16,
            workload_role: "readonly".into(),
            target: TargetConfig::default(),
        }
    }
}

impl RunConfig {
    /// Create a config with the given user count and workload duration
    pub fn new(users: usize, duration: Duration) -> Self {
        Self {
            users,
            duration,
            ..Default::default()
        }
    }

    /// Set the principal name prefix
    pub fn with_user_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_prefix = prefix.into();
        self
    }

    /// Set the target length for generated credentials
    pub fn with_password_length(mut self, length: usize) -> Self {
        self.password_length = length;
        self
    }

    /// Set the role granted to each principal
    pub fn with_workload_role(mut self, role: impl Into<String>) -> Self {
        self.workload_role = role.into();
        self
    }

    /// Set the query target
    pub fn with_target(mut self, target: TargetConfig) -> Self {
        self.target = target;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users == 0 {
            return Err(ConfigError::InvalidUserCount(
                "user count must be at least 1".into(),
            ));
        }

        // Prefix and role are interpolated into DDL unquoted, so they must
        // be plain identifiers.
        if !is_identifier(&self.user_prefix) {
            return Err(ConfigError::InvalidIdentifier(format!(
                "user prefix {:?} is not a plain identifier",
                self.user_prefix
            )));
        }

        if !is_identifier(&self.workload_role) {
            return Err(ConfigError::InvalidIdentifier(format!(
                "workload role {:?} is not a plain identifier",
                self.workload_role
            )));
        }

        if self.password_length < 8 {
            return Err(ConfigError::InvalidPasswordLength(
                "password length must be at least 8".into(),
            ));
        }

        Ok(())
    }
}

/// Check that `s` is a plain SQL identifier: a letter or underscore followed
/// by letters, digits, or underscores.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid user count
    #[error("invalid user count: {0}")]
    InvalidUserCount(String),

    /// A value that must be a plain SQL identifier is not
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Invalid credential length
    #[error("invalid password length: {0}")]
    InvalidPasswordLength(String),
}
