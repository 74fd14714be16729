//! Client for the backend HTTP API.
//!
//! [`BackendGateway`] is the seam between session logic and the network so the
//! service can be driven by a scripted fake in tests. [`HttpGateway`] is the
//! production implementation over [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use docchat_core::job_status::JobStatus;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Access token returned by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
}

/// One file accepted into the ingestion queue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueuedJob {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct ConversationStarted {
    user_collection: String,
}

#[derive(Debug, Deserialize)]
struct IngestReceipt {
    #[serde(default)]
    queued_jobs: Vec<QueuedJob>,
}

#[derive(Debug, Serialize)]
struct IngestBody<'a> {
    conv_id: &'a str,
    files: &'a [String],
    ingest_collection: &'a str,
}

/// Errors from the backend API layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Backend operations the front end depends on.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Check credentials. `Ok(None)` means the backend rejected them.
    async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<TokenGrant>, GatewayError>;

    /// Open conversation `conv_id` and return the user's read collection.
    async fn start_conversation(
        &self,
        token: &str,
        conv_id: &str,
        username: &str,
    ) -> Result<String, GatewayError>;

    /// Submit `files` for ingestion into `collection`.
    async fn enqueue_batch(
        &self,
        token: &str,
        session_id: &str,
        username: &str,
        files: &[String],
        collection: &str,
    ) -> Result<Vec<QueuedJob>, GatewayError>;

    /// Current job snapshot for conversation `conv_id`, in backend order.
    async fn batch_status(&self, token: &str, conv_id: &str)
        -> Result<Vec<JobStatus>, GatewayError>;

    /// End the backend side of the session.
    async fn logout(&self, token: &str, conv_id: &str, username: &str)
        -> Result<(), GatewayError>;
}

/// HTTP client for a single backend instance.
pub struct HttpGateway {
    client: reqwest::Client,
    api_url: String,
}

impl HttpGateway {
    /// Create a gateway with a per-request `timeout`.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host:8000`.
    pub fn new(api_url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GatewayError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Check status and deserialize the JSON body.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<TokenGrant>, GatewayError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .client
            .post(format!("{}/validate_user/{}", self.api_url, username))
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    async fn start_conversation(
        &self,
        token: &str,
        conv_id: &str,
        username: &str,
    ) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "conv_id": conv_id,
            "username": username,
        });

        let response = self
            .client
            .post(format!("{}/conversation/start", self.api_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let started: ConversationStarted = Self::parse_response(response).await?;
        Ok(started.user_collection)
    }

    async fn enqueue_batch(
        &self,
        token: &str,
        session_id: &str,
        username: &str,
        files: &[String],
        collection: &str,
    ) -> Result<Vec<QueuedJob>, GatewayError> {
        let body = IngestBody {
            conv_id: session_id,
            files,
            ingest_collection: collection,
        };

        let response = self
            .client
            .post(format!("{}/ingest/{}${}", self.api_url, session_id, username))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let receipt: IngestReceipt = Self::parse_response(response).await?;
        Ok(receipt.queued_jobs)
    }

    async fn batch_status(
        &self,
        token: &str,
        conv_id: &str,
    ) -> Result<Vec<JobStatus>, GatewayError> {
        let response = self
            .client
            .get(format!("{}/batch_status/{}", self.api_url, conv_id))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn logout(&self, token: &str, conv_id: &str, username: &str) -> Result<(), GatewayError> {
        let body = serde_json::json!({
            "conv_id": conv_id,
            "user": username,
        });

        let response = self
            .client
            .post(format!("{}/logout", self.api_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        Self::ensure_success(response).await.map(|_| ())
    }
}
