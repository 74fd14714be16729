//! Session lifecycle and batch-status polling, independent of HTTP.
//!
//! Every operation is keyed by the caller's runtime key (one per open page).
//! All backend traffic goes through a [`BackendGateway`]; all polling
//! decisions go through [`docchat_core::polling::transition`].

use std::path::Path;
use std::sync::Arc;

use docchat_core::job_status::JobStatus;
use docchat_core::polling::{PollEvent, PollState, RenderDecision};
use serde::Serialize;

use crate::gateway::{BackendGateway, GatewayError};
use crate::registry::SessionRegistry;
use crate::session::{SessionHandle, SessionState, SessionView};
use crate::token::peek_claims;

/// Failures surfaced to callers of [`SessionService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No session for key '{0}'")]
    NoSession(String),

    #[error("Backend request failed: {0}")]
    Backend(#[from] GatewayError),
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// Single-use key the user's page presents on attach. Random, so only the
    /// client that logged in can claim the session.
    pub login_key: String,
    pub session: SessionView,
}

/// Result of binding a page to its session.
#[derive(Debug, Clone, Serialize)]
pub struct AttachOutcome {
    pub session: SessionView,
    pub status: RenderDecision,
}

/// Result of a batch upload request.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    /// Whether a batch was handed to the backend.
    pub accepted: bool,
    /// User-facing summary.
    pub message: String,
    /// File names the backend reported as queued.
    pub queued: Vec<String>,
    pub status: RenderDecision,
}

/// Owns the session registry and drives every session operation.
pub struct SessionService {
    gateway: Arc<dyn BackendGateway>,
    registry: Arc<SessionRegistry>,
}

impl SessionService {
    pub fn new(gateway: Arc<dyn BackendGateway>, registry: Arc<SessionRegistry>) -> Self {
        Self { gateway, registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Authenticate against the backend and file a new session under a fresh
    /// login key until a page attaches to it.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let grant = self
            .gateway
            .validate_user(username, password)
            .await
            .inspect_err(|e| tracing::error!(error = %e, username, "Credential check failed"))?
            .ok_or_else(|| {
                tracing::info!(username, "Login rejected");
                ServiceError::InvalidCredentials
            })?;

        if !grant.token_type.eq_ignore_ascii_case("bearer") {
            tracing::warn!(username, token_type = %grant.token_type, "Unexpected token type");
        }

        let is_admin = match peek_claims(&grant.access_token) {
            Some(claims) => claims.admin,
            None => {
                tracing::warn!(username, "Access token has no readable claims, treating as non-admin");
                false
            }
        };

        let mut session = SessionState::new(username, grant.access_token, is_admin, "");
        session.read_collection = self
            .gateway
            .start_conversation(&session.access_token, &session.session_id, username)
            .await
            .inspect_err(|e| tracing::error!(error = %e, username, "Conversation start failed"))?;

        let login_key = uuid::Uuid::new_v4().to_string();
        let view = session.view();
        self.registry.create(&login_key, session).await;
        tracing::info!(username, is_admin, session_id = %view.session_id, "User logged in");
        Ok(LoginOutcome {
            login_key,
            session: view,
        })
    }

    /// Bind `runtime_key` to the session filed under `login_key` and load the
    /// current batch status for admins.
    ///
    /// Idempotent: a second attach from the same page returns the same
    /// session without moving anything.
    pub async fn attach(
        &self,
        runtime_key: &str,
        login_key: &str,
    ) -> Result<AttachOutcome, ServiceError> {
        let handle = self
            .registry
            .attach(runtime_key, login_key)
            .await
            .ok_or_else(|| ServiceError::NoSession(login_key.to_string()))?;

        let mut session = handle.lock().await;
        session.poll = PollState::default();
        let status = if session.can_ingest() {
            Self::fetch_with(self.gateway.as_ref(), &mut session, PollEvent::Snapshot).await
        } else {
            session.poll.render()
        };

        Ok(AttachOutcome {
            session: session.view(),
            status,
        })
    }

    /// One polling tick.
    ///
    /// Fetches only while the session is polling; otherwise re-renders the
    /// last snapshot. An unknown key renders as hidden.
    pub async fn refresh_status(&self, runtime_key: &str) -> RenderDecision {
        let Some(handle) = self.registry.lookup(runtime_key).await else {
            return PollState::default().render();
        };
        let mut session = handle.lock().await;
        Self::tick(self.gateway.as_ref(), &mut session).await
    }

    /// Submit the existing, non-empty paths in `files` as one batch.
    pub async fn upload(
        &self,
        runtime_key: &str,
        files: Vec<String>,
    ) -> Result<UploadOutcome, ServiceError> {
        let handle = self.session(runtime_key).await?;
        let mut session = handle.lock().await;

        if !session.authenticated {
            return Ok(rejected(&session, "Please log in first."));
        }
        if !session.is_admin {
            return Ok(rejected(&session, "Batch upload requires admin privileges."));
        }

        let valid = existing_files(files).await;
        if valid.is_empty() {
            return Ok(rejected(&session, "No valid files selected."));
        }

        session.apply(PollEvent::Enqueued);
        let result = self
            .gateway
            .enqueue_batch(
                &session.access_token,
                &session.session_id,
                &session.username,
                &valid,
                &session.read_collection,
            )
            .await;

        let queued = match result {
            Ok(jobs) => jobs.into_iter().map(|job| job.filename).collect::<Vec<_>>(),
            Err(e) => {
                tracing::error!(error = %e, username = %session.username, "Batch upload failed");
                let status = session.apply(PollEvent::FetchFailed);
                return Ok(UploadOutcome {
                    accepted: false,
                    message: format!("Batch upload failed: {e}"),
                    queued: Vec::new(),
                    status,
                });
            }
        };

        tracing::info!(
            username = %session.username,
            submitted = valid.len(),
            queued = queued.len(),
            "Batch submitted"
        );
        let message = if queued.is_empty() {
            "No files were queued.".to_string()
        } else {
            format!("Queued for ingestion: {}", queued.join(", "))
        };
        let status =
            Self::fetch_with(self.gateway.as_ref(), &mut session, PollEvent::Refreshed).await;

        Ok(UploadOutcome {
            accepted: true,
            message,
            queued,
            status,
        })
    }

    /// Make `conv_id` the session's conversation.
    ///
    /// Its batch status is unknown until the next scheduled tick, which runs
    /// with a full grace budget.
    pub async fn switch_conversation(
        &self,
        runtime_key: &str,
        conv_id: &str,
    ) -> Result<RenderDecision, ServiceError> {
        let handle = self.session(runtime_key).await?;
        let mut session = handle.lock().await;

        session.session_id = conv_id.to_string();
        tracing::debug!(runtime_key, conv_id, "Conversation switched");
        Ok(session.apply(PollEvent::ConversationSwitched))
    }

    /// Log out on the backend, then drop the session.
    ///
    /// A backend failure is returned and the session is kept.
    pub async fn logout(&self, runtime_key: &str) -> Result<(), ServiceError> {
        let handle = self.session(runtime_key).await?;
        {
            let session = handle.lock().await;
            self.gateway
                .logout(&session.access_token, &session.session_id, &session.username)
                .await
                .inspect_err(|e| {
                    tracing::error!(error = %e, username = %session.username, "Backend logout failed")
                })?;
            tracing::info!(username = %session.username, "User logged out");
        }
        self.registry.destroy(runtime_key).await;
        Ok(())
    }

    /// Drop the session bound to a closed page. No-op if there is none.
    pub async fn teardown(&self, runtime_key: &str) {
        self.registry.destroy(runtime_key).await;
        let remaining = self.registry.len().await;
        tracing::debug!(runtime_key, remaining, "Page torn down");
    }

    // ---- private helpers ----

    async fn session(&self, runtime_key: &str) -> Result<SessionHandle, ServiceError> {
        self.registry
            .lookup(runtime_key)
            .await
            .ok_or_else(|| ServiceError::NoSession(runtime_key.to_string()))
    }

    async fn tick(gateway: &dyn BackendGateway, session: &mut SessionState) -> RenderDecision {
        if !session.can_ingest() {
            session.poll = PollState::default();
            return session.poll.render();
        }
        if !session.poll_active() {
            return session.poll.render();
        }
        Self::fetch_with(gateway, session, PollEvent::Snapshot).await
    }

    /// Fetch the current snapshot and feed it in as `event`.
    async fn fetch_with(
        gateway: &dyn BackendGateway,
        session: &mut SessionState,
        event: fn(Vec<JobStatus>) -> PollEvent,
    ) -> RenderDecision {
        match gateway
            .batch_status(&session.access_token, &session.session_id)
            .await
        {
            Ok(snapshot) => session.apply(event(snapshot)),
            Err(e) => {
                tracing::error!(error = %e, session_id = %session.session_id, "Batch status fetch failed");
                session.apply(PollEvent::FetchFailed)
            }
        }
    }
}

fn rejected(session: &SessionState, message: &str) -> UploadOutcome {
    UploadOutcome {
        accepted: false,
        message: message.to_string(),
        queued: Vec::new(),
        status: session.poll.render(),
    }
}

/// Keep paths that are non-blank and name an existing regular file.
async fn existing_files(files: Vec<String>) -> Vec<String> {
    let mut valid = Vec::with_capacity(files.len());
    for file in files {
        if file.trim().is_empty() {
            continue;
        }
        match tokio::fs::metadata(Path::new(&file)).await {
            Ok(meta) if meta.is_file() => valid.push(file),
            _ => tracing::debug!(file = %file, "Skipping missing upload"),
        }
    }
    valid
}
