//! API Gateway
//!
//! Authenticates bearer tokens and proxies requests to upstream services.

use api_gateway::config::Config;
use api_gateway::routes::{self, AppState};
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
                .unwrap_or_else(|_| "api_gateway=debug,common=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting API Gateway");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        validation_mode = config.validation_mode.as_str(),
        auth_parse_url = %config.auth_parse_url,
        auth_parse_timeout_ms = config.auth_parse_timeout.as_millis(),
        routes = config.routes.len(),
        "Configuration loaded successfully"
    );

    for rule in &config.routes {
        info!(prefix = %rule.prefix, upstream = %rule.upstream, access = ?rule.access, "Route registered");
    }

    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let bind_address = config.bind_address.clone();
    let drain_period = config.drain_period;

    let state = Arc::new(AppState::new(config).map_err(|e| {
        error!("Failed to build application state: {}", e);
        e
    })?);

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("API Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_period))
        .await?;

    info!("API Gateway shutdown complete");

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
