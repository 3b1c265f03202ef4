//! Check-in server
//!
//! REST API for organizations, events and registrations, plus the public
//! kiosk check-in and the presigned upload endpoint.

mod audit;
mod auth;
mod config;
mod error;
mod routes;
mod state;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServiceConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "checkin_server=debug,checkin_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        data_dir = ?config.data_dir,
        environment = %config.environment,
        fuzzy_phone_match = config.fuzzy_phone_match,
        "Starting check-in server"
    );
    let bind_addr = config.bind_addr;

    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;

    let app = routes::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("REST API listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
