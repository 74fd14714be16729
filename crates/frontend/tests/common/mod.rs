#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;

use docchat_core::job_status::{JobState, JobStatus};
use docchat_frontend::config::FrontendConfig;
use docchat_frontend::gateway::{BackendGateway, GatewayError, QueuedJob, TokenGrant};
use docchat_frontend::registry::SessionRegistry;
use docchat_frontend::router::build_app_router;
use docchat_frontend::service::SessionService;
use docchat_frontend::state::AppState;

/// Sign a token the way the backend would. The front end never checks the
/// signature, so any secret will do.
pub fn backend_token(username: &str, admin: bool) -> String {
    encode(
        &Header::default(),
        &serde_json::json!({
            "sub": username,
            "admin": admin,
            "collections": [format!("{username}_docs")],
            "exp": 4_102_444_800_i64,
        }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("encoding should succeed")
}

fn unavailable() -> GatewayError {
    GatewayError::ApiError {
        status: 503,
        body: "backend down".into(),
    }
}

/// In-memory backend with scripted status responses.
///
/// Status fetches pop from the script; an exhausted script answers with an
/// empty snapshot.
#[derive(Default)]
pub struct FakeGateway {
    users: HashMap<String, (String, bool)>,
    statuses: Mutex<VecDeque<Result<Vec<JobStatus>, ()>>>,
    pub status_requests: Mutex<Vec<String>>,
    pub enqueued: Mutex<Vec<Vec<String>>>,
    pub logouts: Mutex<Vec<(String, String)>>,
    pub fail_enqueue: AtomicBool,
    pub fail_logout: AtomicBool,
}

impl FakeGateway {
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert("alice".to_string(), ("alice-password".to_string(), true));
        users.insert("bob".to_string(), ("bob-password".to_string(), false));
        Self {
            users,
            ..Self::default()
        }
    }

    pub fn push_status(&self, jobs: Vec<JobStatus>) {
        self.statuses.lock().unwrap().push_back(Ok(jobs));
    }

    pub fn push_status_failure(&self) {
        self.statuses.lock().unwrap().push_back(Err(()));
    }

    pub fn status_calls(&self) -> usize {
        self.status_requests.lock().unwrap().len()
    }

    pub fn enqueue_calls(&self) -> usize {
        self.enqueued.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<TokenGrant>, GatewayError> {
        Ok(match self.users.get(username) {
            Some((expected, admin)) if expected == password => Some(TokenGrant {
                access_token: backend_token(username, *admin),
                token_type: "bearer".into(),
            }),
            _ => None,
        })
    }

    async fn start_conversation(
        &self,
        _token: &str,
        _conv_id: &str,
        username: &str,
    ) -> Result<String, GatewayError> {
        Ok(format!("{username}_docs"))
    }

    async fn enqueue_batch(
        &self,
        _token: &str,
        _session_id: &str,
        _username: &str,
        files: &[String],
        _collection: &str,
    ) -> Result<Vec<QueuedJob>, GatewayError> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.enqueued.lock().unwrap().push(files.to_vec());
        Ok(files
            .iter()
            .map(|f| QueuedJob {
                filename: f.rsplit('/').next().unwrap_or(f).to_string(),
            })
            .collect())
    }

    async fn batch_status(
        &self,
        _token: &str,
        conv_id: &str,
    ) -> Result<Vec<JobStatus>, GatewayError> {
        self.status_requests.lock().unwrap().push(conv_id.to_string());
        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(jobs)) => Ok(jobs),
            Some(Err(())) => Err(unavailable()),
            None => Ok(Vec::new()),
        }
    }

    async fn logout(&self, _token: &str, conv_id: &str, username: &str) -> Result<(), GatewayError> {
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.logouts
            .lock()
            .unwrap()
            .push((conv_id.to_string(), username.to_string()));
        Ok(())
    }
}

pub fn queued(filename: &str) -> Vec<JobStatus> {
    vec![JobStatus::new(filename, JobState::Queued)]
}

pub fn done(filename: &str) -> Vec<JobStatus> {
    vec![JobStatus::new(filename, JobState::Done)]
}

pub fn test_service(gateway: Arc<FakeGateway>) -> SessionService {
    SessionService::new(gateway, Arc::new(SessionRegistry::new()))
}

pub fn test_config() -> FrontendConfig {
    FrontendConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8083".to_string()],
        request_timeout_secs: 30,
        backend_url: "http://backend.invalid".to_string(),
        backend_timeout_secs: 5,
        poll_interval_secs: 5,
    }
}

/// Build the full application router and its state over `gateway`.
pub fn build_test_app(gateway: Arc<FakeGateway>) -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(config.clone(), gateway);
    (build_app_router(state.clone(), &config), state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::delete(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
