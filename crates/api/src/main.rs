use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use lemos_core::contacts::EnvContacts;
use lemos_core::thresholds::DEFAULT_RULES;
use lemos_notify::{Notifier, TwilioProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lemos_api::config::ServerConfig;
use lemos_api::latest::LatestReadings;
use lemos_api::router::build_app_router;
use lemos_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lemos_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid server configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Notifier ---
    let provider = match TwilioProvider::new() {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build SMS HTTP client");
            std::process::exit(1);
        }
    };
    let notifier = Notifier::new(Arc::new(EnvContacts), Arc::new(provider));
    if notifier.is_configured() {
        tracing::info!("SMS transport configured");
    } else {
        tracing::warn!("Twilio credentials not configured, SMS notifications disabled");
    }

    // --- App state ---
    let state = AppState {
        notifier,
        rules: Arc::new(DEFAULT_RULES),
        latest: Arc::new(LatestReadings::new()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = match config.host.parse() {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            std::process::exit(1);
        }
    };

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    // Bound the drain of in-flight requests once a signal has arrived.
    let outcome = tokio::select! {
        result = server => Some(result),
        () = async {
            shutdown_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => None,
    };

    match outcome {
        Some(Ok(())) => tracing::info!("Graceful shutdown complete"),
        Some(Err(e)) => {
            tracing::error!(error = %e, "Server error");
            std::process::exit(1);
        }
        None => tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Shutdown timeout elapsed, dropping in-flight requests"
        ),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
