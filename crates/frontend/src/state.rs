use std::sync::Arc;

use crate::config::FrontendConfig;
use crate::gateway::BackendGateway;
use crate::registry::SessionRegistry;
use crate::service::SessionService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FrontendConfig>,
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(config: FrontendConfig, gateway: Arc<dyn BackendGateway>) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionService::new(gateway, registry)),
        }
    }
}
