pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the auth route tree.
///
/// ```text
/// /validate_user/{username}      login (public)
/// /create_user                   create or replace a user (admin)
/// /logout                        close the caller's conversation (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/validate_user/{username}",
            post(handlers::auth::validate_user),
        )
        .route("/create_user", post(handlers::users::create_user))
        .route("/logout", post(handlers::auth::logout))
}
