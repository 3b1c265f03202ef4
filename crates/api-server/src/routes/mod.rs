//! Route handlers

pub mod audit;
pub mod auth;
pub mod checkin;
pub mod event;
pub mod health;
pub mod kiosk;
pub mod organization;
pub mod registration;
pub mod stats;
pub mod upload;

use axum::Router;

use crate::state::AppState;

/// The full REST surface, without transport layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(organization::router())
        .merge(event::router())
        .merge(registration::router())
        .merge(checkin::router())
        .merge(kiosk::router())
        .merge(upload::router())
        .merge(stats::router())
        .merge(audit::router())
        .with_state(state)
}
