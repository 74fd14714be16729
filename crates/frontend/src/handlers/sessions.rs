//! Handlers for login, page attachment, batch upload and status polling.
//!
//! Every route under `/sessions/{runtime_key}` is scoped to one open page.
//! The runtime key is chosen by the client and must be stable for the life of
//! the page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use docchat_core::error::CoreError;
use docchat_core::polling::RenderDecision;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::service::{AttachOutcome, LoginOutcome, UploadOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    /// The `login_key` returned by `POST /login`.
    pub login_key: String,
}

#[derive(Debug, Serialize)]
pub struct AttachResponse {
    #[serde(flatten)]
    pub outcome: AttachOutcome,
    /// How often the client should call the status endpoint while
    /// `status.keep_polling` is set.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    pub conv_id: String,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginOutcome>> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(CoreError::Validation("Username must not be empty".into()).into());
    }

    Ok(Json(state.sessions.login(username, &input.password).await?))
}

/// POST /sessions/{runtime_key}/attach
pub async fn attach(
    State(state): State<AppState>,
    Path(runtime_key): Path<String>,
    Json(input): Json<AttachRequest>,
) -> AppResult<Json<AttachResponse>> {
    let outcome = state
        .sessions
        .attach(&runtime_key, input.login_key.trim())
        .await?;
    Ok(Json(AttachResponse {
        outcome,
        poll_interval_secs: state.config.poll_interval_secs,
    }))
}

/// GET /sessions/{runtime_key}/status
pub async fn status(
    State(state): State<AppState>,
    Path(runtime_key): Path<String>,
) -> Json<RenderDecision> {
    Json(state.sessions.refresh_status(&runtime_key).await)
}

/// POST /sessions/{runtime_key}/ingest
pub async fn ingest(
    State(state): State<AppState>,
    Path(runtime_key): Path<String>,
    Json(input): Json<IngestRequest>,
) -> AppResult<Json<UploadOutcome>> {
    Ok(Json(state.sessions.upload(&runtime_key, input.files).await?))
}

/// POST /sessions/{runtime_key}/conversation
pub async fn switch_conversation(
    State(state): State<AppState>,
    Path(runtime_key): Path<String>,
    Json(input): Json<ConversationRequest>,
) -> AppResult<Json<RenderDecision>> {
    let conv_id = input.conv_id.trim();
    if conv_id.is_empty() {
        return Err(CoreError::Validation("conv_id must not be empty".into()).into());
    }
    Ok(Json(
        state
            .sessions
            .switch_conversation(&runtime_key, conv_id)
            .await?,
    ))
}

/// POST /sessions/{runtime_key}/logout
pub async fn logout(
    State(state): State<AppState>,
    Path(runtime_key): Path<String>,
) -> AppResult<Json<DetailResponse>> {
    state.sessions.logout(&runtime_key).await?;
    Ok(Json(DetailResponse {
        detail: "Logged out".into(),
    }))
}

/// DELETE /sessions/{runtime_key}
pub async fn teardown(
    State(state): State<AppState>,
    Path(runtime_key): Path<String>,
) -> StatusCode {
    state.sessions.teardown(&runtime_key).await;
    StatusCode::NO_CONTENT
}
