//! SMS Forwarder server binary.
//!
//! Loads configuration, wires the two routes, and serves until SIGINT or
//! SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forwarder::web::{health, inbound_sms, AppState};
use forwarder::{Config, SERVICE_NAME};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(name = SERVICE_NAME, "server_starting");

    // Fail closed: missing secrets abort startup, not the first request.
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        slack_webhook_configured = !config.slack_webhook_url.is_empty(),
        twilio_auth_configured = !config.twilio_auth_token.is_empty(),
        "config_loaded"
    );

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let state = AppState::new(config.clone(), http);

    let app = Router::new()
        .route("/api/inbound-sms", get(health).post(inbound_sms))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("server_shutting_down");
}
