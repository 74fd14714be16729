//! Per-user session state held by the front end.

use std::sync::Arc;

use docchat_core::job_status::JobStatus;
use docchat_core::polling::{transition, PollEvent, PollState, RenderDecision};
use serde::Serialize;
use tokio::sync::Mutex;

/// Shared, lockable handle to one session.
///
/// The registry hands out clones of the same `Arc`, so every page bound to a
/// session mutates one state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Everything the front end remembers about one logged-in user.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub authenticated: bool,
    /// Conversation id; a fresh UUID v4 per login, replaced on conversation switch.
    pub session_id: String,
    pub username: String,
    /// Collection the user's questions are answered from.
    pub read_collection: String,
    /// Opaque bearer token for backend calls. Never sent to clients.
    pub access_token: String,
    pub is_admin: bool,
    pub poll: PollState,
}

impl SessionState {
    /// A freshly authenticated session with a new conversation id.
    pub fn new(
        username: impl Into<String>,
        access_token: impl Into<String>,
        is_admin: bool,
        read_collection: impl Into<String>,
    ) -> Self {
        Self::with_session_id(
            uuid::Uuid::new_v4().to_string(),
            username,
            access_token,
            is_admin,
            read_collection,
        )
    }

    pub fn with_session_id(
        session_id: impl Into<String>,
        username: impl Into<String>,
        access_token: impl Into<String>,
        is_admin: bool,
        read_collection: impl Into<String>,
    ) -> Self {
        Self {
            authenticated: true,
            session_id: session_id.into(),
            username: username.into(),
            read_collection: read_collection.into(),
            access_token: access_token.into(),
            is_admin,
            poll: PollState::default(),
        }
    }

    pub fn poll_active(&self) -> bool {
        self.poll.phase.is_polling()
    }

    pub fn poll_grace_remaining(&self) -> u8 {
        self.poll.phase.grace_remaining()
    }

    pub fn last_batch_snapshot(&self) -> &[JobStatus] {
        &self.poll.snapshot
    }

    /// Whether this session may submit batches and see their status.
    pub fn can_ingest(&self) -> bool {
        self.authenticated && self.is_admin
    }

    /// Feed one event through the polling machine and store the result.
    pub fn apply(&mut self, event: PollEvent) -> RenderDecision {
        let (next, decision) = transition(&self.poll, self.can_ingest(), event);
        self.poll = next;
        decision
    }

    /// Client-safe summary. Omits the access token.
    pub fn view(&self) -> SessionView {
        SessionView {
            username: self.username.clone(),
            session_id: self.session_id.clone(),
            read_collection: self.read_collection.clone(),
            is_admin: self.is_admin,
            poll_active: self.poll_active(),
            poll_grace_remaining: self.poll_grace_remaining(),
        }
    }
}

/// What a client is told about its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub username: String,
    pub session_id: String,
    pub read_collection: String,
    pub is_admin: bool,
    pub poll_active: bool,
    pub poll_grace_remaining: u8,
}
