//! Error types for frostbench-core

use thiserror::Error;

use crate::traits::ClientError;

/// Core error type
#[derive(Error, Debug)]
pub enum RunError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Orchestration error
    #[error("orchestration error: {0}")]
    Orchestration(String),

    /// Warehouse client error
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl RunError {
    /// Configuration error for a required field that was not provided
    pub fn missing_config(field: &str) -> Self {
        RunError::Config(format!("missing required field: {field}"))
    }

    /// Configuration error with the given message
    pub fn config(message: impl Into<String>) -> Self {
        RunError::Config(message.into())
    }

    /// Orchestration error with the given message
    pub fn orchestration(message: impl Into<String>) -> Self {
        RunError::Orchestration(message.into())
    }
}

/// Result type alias
pub type RunResult<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message() {
        let err = RunError::missing_config("client");
        assert_eq!(
            err.to_string(),
            "configuration error: missing required field: client"
        );
    }

    #[test]
    fn test_client_error_is_transparent() {
        let err = RunError::from(ClientError::Auth("bad password".into()));
        assert_eq!(err.to_string(), "authentication failed: bad password");
    }
}
