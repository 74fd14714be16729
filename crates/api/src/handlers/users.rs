//! Handler for administrative user creation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use docchat_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;
use crate::store::CredentialRecord;

/// Minimum password length enforced on user creation.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Request body for `POST /create_user`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    pub password: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub collections: Vec<String>,
}

/// Stored user as returned to the caller; never includes the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub disabled: bool,
    pub admin: bool,
    pub collections: Vec<String>,
}

/// POST /create_user
///
/// Create or replace a user record. Admin only.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username must not be empty".into(),
        )));
    }

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let record = CredentialRecord {
        username: username.to_string(),
        full_name: input.fullname,
        password_hash,
        disabled: input.disabled,
        admin: input.admin,
        collections: input.collections,
    };
    state.credentials.upsert(username, record.clone()).await?;

    tracing::info!(username = %record.username, created_by = %admin.username, "User created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: record.username,
            full_name: record.full_name,
            disabled: record.disabled,
            admin: record.admin,
            collections: record.collections,
        }),
    ))
}
