//! Handlers for login and logout.

use axum::extract::{Path, State};
use axum::Json;
use docchat_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Message for every failed login, whatever the cause.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /validate_user/{username}`.
#[derive(Debug, Deserialize)]
pub struct ValidateUserRequest {
    pub username: String,
    pub password: String,
    /// Credential store the client expects to be checked. Only the
    /// configured store is ever read; a different path is logged and ignored.
    #[serde(default, alias = "USER_DB_PATH")]
    pub credential_store_path: Option<String>,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Request body for `POST /logout`.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub conv_id: String,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /validate_user/{username}
///
/// Check the password against the credential store and issue an access token
/// carrying the user's admin flag and collections.
pub async fn validate_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(input): Json<ValidateUserRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    if let Some(requested) = &input.credential_store_path {
        if std::path::Path::new(requested) != state.credentials.path() {
            tracing::warn!(
                requested = %requested,
                configured = %state.credentials.path().display(),
                "Ignoring client-supplied credential store path"
            );
        }
    }

    if input.username != username {
        tracing::info!(path_user = %username, body_user = %input.username, "Login username mismatch");
        return Err(invalid());
    }

    let Some(record) = state.credentials.get(&username).await else {
        tracing::info!(username = %username, "Login for unknown user");
        return Err(invalid());
    };

    if record.disabled {
        tracing::info!(username = %username, "Login for disabled user");
        return Err(invalid());
    }

    let password_valid = verify_password(&input.password, &record.password_hash)
        .inspect_err(|e| tracing::error!(username = %username, error = %e, "Stored password hash unreadable"))
        .unwrap_or(false);
    if !password_valid {
        tracing::info!(username = %username, "Invalid credentials");
        return Err(invalid());
    }

    let access_token = state
        .tokens
        .issue(&record.username, record.admin, record.collections)?;

    tracing::info!(username = %username, admin = record.admin, "Issued access token");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// POST /logout
///
/// Close the caller's conversation. The token subject must match `user`.
pub async fn logout(
    auth_user: AuthUser,
    Json(input): Json<LogoutRequest>,
) -> AppResult<Json<LogoutResponse>> {
    if auth_user.username != input.user {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot log out another user".into(),
        )));
    }

    tracing::info!(username = %input.user, conv_id = %input.conv_id, "User logged out");
    Ok(Json(LogoutResponse {
        detail: format!("Logged out session {}", input.conv_id),
    }))
}
