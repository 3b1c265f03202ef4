//! Admin check-in endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use checkin_core::checkin::{CheckIn, CheckInResult, ManualCheckInRequest, UpdateCheckInRequest};
use checkin_core::registration::AttendeeKey;

use crate::{audit::AuditEvent, auth::AdminSession, error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
struct EventQuery {
    event_code: String,
}

/// GET /checkin?phone=&event_code=
async fn get_checkin(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(key): Query<AttendeeKey>,
) -> ApiResult<Json<CheckIn>> {
    Ok(Json(state.checkins().get(&key.event_code, &key.phone).await?))
}

async fn list_checkins(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<EventQuery>,
) -> ApiResult<Json<Vec<CheckIn>>> {
    Ok(Json(state.checkins().list(&query.event_code).await?))
}

/// POST /checkin - check an attendee in on their behalf. The window is
/// always checked against the current time; `checked_at` only sets the
/// recorded instant.
async fn create_checkin(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<ManualCheckInRequest>,
) -> ApiResult<(StatusCode, Json<CheckInResult>)> {
    let outcome = state
        .checkins()
        .check_in_at(&req.event_code, &req.phone, Utc::now(), req.checked_at)
        .await?;

    let status = if outcome.created {
        state
            .record(
                AuditEvent::new(session.username, "checkin.create")
                    .for_event(&req.event_code)
                    .target(&outcome.checkin.phone),
            )
            .await;
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.result())))
}

async fn update_checkin(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<UpdateCheckInRequest>,
) -> ApiResult<Json<CheckIn>> {
    let updated = state.checkins().update(req).await?;
    state
        .record(
            AuditEvent::new(session.username, "checkin.update")
                .for_event(&updated.event_code)
                .target(&updated.phone),
        )
        .await;
    Ok(Json(updated))
}

async fn delete_checkin(
    State(state): State<AppState>,
    session: AdminSession,
    Json(key): Json<AttendeeKey>,
) -> ApiResult<StatusCode> {
    state.checkins().delete(&key.event_code, &key.phone).await?;
    state
        .record(
            AuditEvent::new(session.username, "checkin.delete")
                .for_event(key.event_code)
                .target(key.phone),
        )
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/checkin",
            get(get_checkin)
                .post(create_checkin)
                .put(update_checkin)
                .delete(delete_checkin),
        )
        .route("/checkin/list", get(list_checkins))
}
