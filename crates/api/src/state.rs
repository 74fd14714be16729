use std::sync::Arc;

use crate::auth::jwt::TokenCodec;
use crate::config::ServerConfig;
use crate::store::CredentialStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Token codec built from `config.jwt`.
    pub tokens: Arc<TokenCodec>,
    /// The configured credential store.
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let tokens = Arc::new(TokenCodec::new(config.jwt.clone()));
        let credentials = Arc::new(CredentialStore::new(config.credential_store_path.clone()));
        Self {
            config: Arc::new(config),
            tokens,
            credentials,
        }
    }
}
