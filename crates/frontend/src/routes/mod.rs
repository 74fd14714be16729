pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Session routes.
///
/// ```text
/// POST   /login                                 -> login
/// POST   /sessions/{runtime_key}/attach         -> attach
/// GET    /sessions/{runtime_key}/status         -> status
/// POST   /sessions/{runtime_key}/ingest         -> ingest
/// POST   /sessions/{runtime_key}/conversation   -> switch_conversation
/// POST   /sessions/{runtime_key}/logout         -> logout
/// DELETE /sessions/{runtime_key}                -> teardown
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(sessions::login))
        .route("/sessions/{runtime_key}", delete(sessions::teardown))
        .route("/sessions/{runtime_key}/attach", post(sessions::attach))
        .route("/sessions/{runtime_key}/status", get(sessions::status))
        .route("/sessions/{runtime_key}/ingest", post(sessions::ingest))
        .route(
            "/sessions/{runtime_key}/conversation",
            post(sessions::switch_conversation),
        )
        .route("/sessions/{runtime_key}/logout", post(sessions::logout))
}
