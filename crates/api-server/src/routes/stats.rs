//! Attendance statistics

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use checkin_core::stats::{EventStats, OrganizationStats};

use crate::{auth::AdminSession, error::ApiResult, state::AppState};

async fn organization_stats(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Json<Vec<OrganizationStats>>> {
    Ok(Json(state.stats().organization_stats().await?))
}

async fn event_stats(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(event_code): Path<String>,
) -> ApiResult<Json<EventStats>> {
    Ok(Json(state.stats().event_stats(&event_code).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(organization_stats))
        .route("/event/{code}/stats", get(event_stats))
}
