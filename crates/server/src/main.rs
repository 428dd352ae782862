//! Prickly Fig Cart Service - remote cart storage API.
//!
//! This binary serves the cart reconciliation API on port 5000.
//!
//! # Architecture
//!
//! - Axum JSON API consumed by the storefront cart client
//! - One stored cart per user, replaced wholesale on every push
//! - `PostgreSQL` for cart rows and API tokens
//! - Opaque bearer tokens resolved against the `api_tokens` table; no
//!   third-party JWT verification in this service

#![cfg_attr(not(test), forbid(unsafe_code))]

mod config;
mod db;
mod error;
mod middleware;
mod routes;
mod state;

use config::CartApiConfig;
use sentry::integrations::tracing as sentry_tracing;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter applied when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "prickly_fig_server=info,tower_http=debug";

/// Start Sentry if a DSN is configured. The guard flushes pending events on
/// drop, so it must live for the whole process.
fn init_sentry(config: &CartApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Install the tracing subscriber, forwarding warnings and errors to Sentry
/// as events and info/debug lines as breadcrumbs.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let sentry_layer =
        sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
            tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
            tracing::Level::INFO | tracing::Level::DEBUG => {
                sentry_tracing::EventFilter::Breadcrumb
            }
            _ => sentry_tracing::EventFilter::Ignore,
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();
}

#[tokio::main]
async fn main() {
    // Config first: the Sentry DSN lives there, and Sentry must be up
    // before the subscriber so its layer has a client to talk to.
    let config = CartApiConfig::from_env().expect("Failed to load configuration");
    let sentry_guard = init_sentry(&config);
    init_tracing();
    tracing::info!(sentry = sentry_guard.is_some(), "Telemetry initialized");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // Migrations are a deploy step, not a startup step:
    // cargo run -p prickly-fig-cli -- migrate
    let state = AppState::new(config, pool);
    let addr = state.config().socket_addr();

    // Sentry layers sit outside the router so they see every request.
    let app = routes::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!("cart service listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve when the process is asked to stop (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        outcome = tokio::signal::ctrl_c() => {
            outcome.expect("Failed to install Ctrl+C handler");
        }
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
