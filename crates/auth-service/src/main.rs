//! Auth Service
//!
//! Issues tokens for registered users and serves remote token parsing.

use auth_service::config::Config;
use auth_service::repositories::InMemoryUserRepository;
use auth_service::routes::{self, AppState};
use auth_service::services::user_service;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,common=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Auth Service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        algorithm = ?config.jwt.signing_key.algorithm(),
        ttl_seconds = config.jwt.ttl.as_secs(),
        bcrypt_cost = config.bcrypt_cost,
        "Configuration loaded successfully"
    );

    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let users = Arc::new(InMemoryUserRepository::new());

    if let Some(seed) = &config.admin {
        user_service::seed_admin(users.as_ref(), config.bcrypt_cost, seed)
            .await
            .map_err(|e| {
                error!("Failed to seed admin user: {}", e);
                e
            })?;
    }

    let bind_address = config.bind_address.clone();
    let drain_period = config.drain_period;

    let state = Arc::new(AppState::new(config, users).map_err(|e| {
        error!("Failed to build application state: {}", e);
        e
    })?);

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Auth Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_period))
        .await?;

    info!("Auth Service shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM, after the configured drain period.
async fn shutdown_signal(drain_period: Duration) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!(signal = "SIGINT", "Shutdown requested"),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        },
        () = terminate => info!(signal = "SIGTERM", "Shutdown requested"),
    }

    if !drain_period.is_zero() {
        warn!(
            drain_seconds = drain_period.as_secs(),
            "Draining before closing listeners"
        );
        tokio::time::sleep(drain_period).await;
    }
}
