//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use docchat_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user decoded from the `Authorization: Bearer <token>` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(username = %user.username, admin = user.admin, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub admin: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let not_authenticated =
            || AppError::Core(CoreError::Unauthorized("Not authenticated".into()));

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(not_authenticated)?;

        let token = bearer_token(header).ok_or_else(not_authenticated)?;

        let claims = state.tokens.validate(token)?;

        Ok(AuthUser {
            username: claims.sub,
            admin: claims.admin,
        })
    }
}

/// The credentials of a `Bearer` authorization header (scheme is
/// case-insensitive). `None` for other schemes or an empty token.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
