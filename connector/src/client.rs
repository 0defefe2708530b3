//! HTTP SQL API client

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use frostbench_core::{ClientError, ConnectParams, ResultSet, WarehouseClient, WarehouseSession};

const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), '/', env!("CARGO_PKG_VERSION"));

/// Client for the warehouse's HTTP SQL API
///
/// One client targets one account; sessions share its connection pool.
#[derive(Debug, Clone)]
pub struct HttpWarehouseClient {
    http: reqwest::Client,
    account: String,
    base_url: String,
}

impl HttpWarehouseClient {
    /// Create a client for `account`
    ///
    /// `base_url` overrides the account's hosted endpoint, mainly for tests
    /// and self-hosted gateways.
    pub fn new(account: impl Into<String>, base_url: Option<String>) -> Self {
        let account = account.into();
        let base_url = base_url
            .unwrap_or_else(|| format!("https://{account}.snowflakecomputing.com/api/v2"));
        Self {
            http: reqwest::Client::new(),
            account,
            base_url,
        }
    }

    fn login_url(&self) -> String {
        format!("{}/session/login", self.base_url)
    }
}

#[async_trait]
impl WarehouseClient for HttpWarehouseClient {
    fn account(&self) -> &str {
        &self.account
    }

    async fn connect(
        &self,
        params: &ConnectParams,
    ) -> Result<Box<dyn WarehouseSession>, ClientError> {
        let request = LoginRequest {
            account: &self.account,
            user: &params.user,
            password: &params.password,
            role: params.role.as_deref(),
            warehouse: params.warehouse.as_deref(),
            database: params.database.as_deref(),
            schema: params.schema.as_deref(),
        };

        let response = self
            .http
            .post(self.login_url())
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let login: LoginResponse = response.json().await?;

        Ok(Box::new(HttpSession {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: login.token,
            closed: false,
        }))
    }
}

/// One authenticated session against the statements endpoint
pub struct HttpSession {
    http: reqwest::Client,
    base_url: String,
    token: String,
    closed: bool,
}

impl HttpSession {
    fn statements_url(&self, request_id: &uuid::Uuid) -> String {
        format!("{}/statements?requestId={}", self.base_url, request_id)
    }

    fn logout_url(&self) -> String {
        format!("{}/session/logout", self.base_url)
    }
}

#[async_trait]
impl WarehouseSession for HttpSession {
    async fn execute(&self, statement: &str) -> Result<ResultSet, ClientError> {
        let request_id = uuid::Uuid::new_v4();
        let response = self
            .http
            .post(self.statements_url(&request_id))
            .bearer_auth(&self.token)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&StatementRequest {
                statement,
                timeout: None,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: StatementResponse = response.json().await?;
        Ok(ResultSet { rows: body.data })
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let response = self
            .http
            .post(self.logout_url())
            .bearer_auth(&self.token)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("base_url", &self.base_url)
            .field("closed", &self.closed)
            .finish()
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    account: &'a str,
    user: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u32>,
}

#[derive(Deserialize, Default)]
struct StatementResponse {
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-success response onto the client error taxonomy
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body: ErrorBody = response.json().await.unwrap_or_default();
    map_error(status, body)
}

fn map_error(status: StatusCode, body: ErrorBody) -> ClientError {
    let message = body.message.unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Auth(message),
        StatusCode::FORBIDDEN => ClientError::Privilege(message),
        _ => ClientError::Query {
            code: body.code,
            message,
        },
    }
}
