use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docchat_api::auth::password::hash_password;
use docchat_api::config::ServerConfig;
use docchat_api::router::build_app_router;
use docchat_api::state::AppState;
use docchat_api::store::CredentialRecord;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        credential_store = %config.credential_store_path.display(),
        "Loaded server configuration"
    );

    let state = AppState::new(config.clone());

    // Refuse to start with an unusable signing configuration rather than
    // failing on the first login.
    if let Err(e) = state.tokens.check() {
        tracing::error!(error = %e, "Token signing configuration invalid");
        std::process::exit(1);
    }

    // --- Credential store ---
    let users = state.credentials.load().await;
    tracing::info!(count = users.len(), "Credential store loaded");
    if users.is_empty() {
        bootstrap_admin(&state).await;
    }

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Seed the first admin from `BOOTSTRAP_ADMIN_USER` / `BOOTSTRAP_ADMIN_PASSWORD`
/// so `POST /create_user` has someone to authenticate as.
async fn bootstrap_admin(state: &AppState) {
    let (Ok(username), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_USER"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        tracing::warn!("Credential store is empty and no bootstrap admin is configured");
        return;
    };

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "Failed to hash bootstrap admin password");
            return;
        }
    };

    let record = CredentialRecord {
        username: username.clone(),
        full_name: username.clone(),
        password_hash,
        disabled: false,
        admin: true,
        collections: Vec::new(),
    };
    match state.credentials.upsert(&username, record).await {
        Ok(()) => tracing::info!(username = %username, "Bootstrap admin created"),
        Err(e) => tracing::error!(error = %e, "Failed to store bootstrap admin"),
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
