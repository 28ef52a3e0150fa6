//! Zombie Arena - arena shooter simulation core and multiplayer relay
//!
//! The binary runs the relay server:
//! - WebSocket fan-out of client events at `/ws`
//! - Health probe at `/health` and optional static hosting of the browser client
//! - Optional headless clients that play against the relay in-process

mod app;
mod client;
mod config;
mod game;
mod http;
mod relay;
mod sync;
mod util;
mod ws;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::client::spawn_bot;
use crate::config::Config;
use crate::http::build_router;
use crate::util::time::{init_server_time, unix_millis};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Zombie Arena relay");
    info!("Server address: {}", config.server_addr);

    // Create application state
    let state = AppState::new(config.clone());

    // Headless clients share the process with the relay
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let base_seed = config.sim_seed.unwrap_or_else(unix_millis);
    let bots: Vec<_> = (0..config.bot_count)
        .map(|i| {
            spawn_bot(
                state.relay.clone(),
                config.sim.clone(),
                base_seed.wrapping_add(i as u64),
                shutdown_rx.clone(),
            )
        })
        .collect();
    if !bots.is_empty() {
        info!(bots = bots.len(), seed = base_seed, "Headless clients started");
    }

    // Build router
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop bots
    let _ = shutdown_tx.send(true);
    for bot in bots {
        if let Err(e) = bot.await {
            warn!(error = %e, "Headless client task failed");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
