//! # C-UAS Threat Feed Server
//!
//! Binary entry point: starts the simulation and serves the WebSocket feed.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threat_realtime_api::{AppState, Config, GatewayPublisher, build_router};
use threat_simulator::{SimulationEngine, SystemClock, TickScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing first so configuration fallbacks are logged
    let log_level = Config::log_level_from_lookup(|key| std::env::var(key).ok());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        version = threat_realtime_api::VERSION,
        "Starting C-UAS threat feed"
    );

    tracing::info!(
        speed_mps = config.simulation.drone_speed_mps,
        tick_ms = config.simulation.tick_interval_ms,
        max_range_m = config.simulation.max_detection_range_m,
        spawn_range_m = config.simulation.spawn_range_m,
        lat = config.simulation.default_reference.latitude,
        lng = config.simulation.default_reference.longitude,
        "Simulation configured"
    );

    // The engine starts ticking before the transport exists; early snapshots
    // are skipped until the publisher is attached
    let publisher = Arc::new(GatewayPublisher::new());
    let engine = SimulationEngine::new(config.simulation.clone());
    let mut scheduler = TickScheduler::new(engine, publisher.clone(), Arc::new(SystemClock));
    scheduler.start();

    let state = AppState::new(scheduler.engine());
    let app = build_router(state.clone(), &config);

    let addr = config.server_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    publisher.attach(state.updates_tx.clone());

    tracing::info!(%addr, "Backend server is running");
    tracing::info!("WebSocket gateway listening at ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
