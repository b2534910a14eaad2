//! # C-UAS Threat Feed Gateway
//!
//! Real-time WebSocket service in front of the threat simulation engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │                (Health + WebSocket /ws)                     │
//! └─────────────────────────────────────────────────────────────┘
//!          │ systemUpdate                    ▲ threatUpdate
//!          ▼                                 │
//! ┌──────────────────────────┐   ┌─────────────────────────────┐
//! │   SimulationEngine       │──▶│  GatewayPublisher           │
//! │ (driven by TickScheduler)│   │  (broadcast channel)        │
//! └──────────────────────────┘   └─────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod publisher;

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use context::AppState;
pub use error::{ApiError, ApiResult};
pub use publisher::GatewayPublisher;

/// Status line reported by the root endpoint
pub const HEALTH_STATUS: &str = "Backend operational (C-UAS Server is online)";

/// Root status endpoint
pub async fn status() -> impl IntoResponse {
    Json(json!({ "status": HEALTH_STATUS }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    "OK"
}

/// Build the CORS layer from configured origins
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_origin(origins)
        .allow_headers(Any)
}

/// Build the Axum router
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health_check))
        .route("/ws", get(gateway::ws_handler))
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
