#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use docchat_api::auth::jwt::JwtConfig;
use docchat_api::auth::password::hash_password;
use docchat_api::config::ServerConfig;
use docchat_api::router::build_app_router;
use docchat_api::state::AppState;
use docchat_api::store::CredentialRecord;

pub const TEST_SECRET: &str = "integration-test-secret-long-enough";

/// Build a test `ServerConfig` pointing at `store_path`.
pub fn test_config(store_path: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8083".to_string()],
        request_timeout_secs: 30,
        credential_store_path: store_path.to_path_buf(),
        jwt: JwtConfig {
            secret: Some(TEST_SECRET.to_string()),
            algorithm: Some("HS256".to_string()),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router and its state over a credential store
/// at `store_path`.
pub fn build_test_app(store_path: &Path) -> (Router, AppState) {
    let config = test_config(store_path);
    let state = AppState::new(config.clone());
    (build_app_router(state.clone(), &config), state)
}

/// Store a user whose password is `password`.
pub async fn seed_user(state: &AppState, username: &str, password: &str, admin: bool) {
    let record = CredentialRecord {
        username: username.to_string(),
        full_name: format!("{username} test"),
        password_hash: hash_password(password).expect("hashing should succeed"),
        disabled: false,
        admin,
        collections: Vec::new(),
    };
    state
        .credentials
        .upsert(username, record)
        .await
        .expect("seeding should succeed");
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
