//! Event endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use checkin_core::event::{CreateEventRequest, Event, UpdateEventRequest};

use crate::{audit::AuditEvent, auth::AdminSession, error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
struct ListEventsQuery {
    #[serde(default)]
    organization_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventKey {
    event_code: String,
}

/// GET /event - newest first, optionally for one organization
async fn list_events(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let organization = query
        .organization_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());
    Ok(Json(state.events().list(organization).await?))
}

async fn get_event(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(code): Path<String>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.events().get(&code).await?))
}

async fn create_event(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let created = state.events().create(req).await?;
    state
        .record(
            AuditEvent::new(session.username, "event.create")
                .for_event(&created.event_code)
                .detail(json!({
                    "organization_code": created.organization_code,
                    "event_version": created.event_version,
                })),
        )
        .await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_event(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    let updated = state.events().update(req).await?;
    state
        .record(AuditEvent::new(session.username, "event.update").for_event(&updated.event_code))
        .await;
    Ok(Json(updated))
}

async fn delete_event(
    State(state): State<AppState>,
    session: AdminSession,
    Json(key): Json<EventKey>,
) -> ApiResult<StatusCode> {
    state.events().delete(&key.event_code).await?;
    state
        .record(AuditEvent::new(session.username, "event.delete").for_event(key.event_code))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /event/{code}/expire - close the check-in window now
async fn expire_event(
    State(state): State<AppState>,
    session: AdminSession,
    Path(code): Path<String>,
) -> ApiResult<Json<Event>> {
    let event = state.events().expire(&code, Utc::now()).await?;
    state
        .record(
            AuditEvent::new(session.username, "event.expire")
                .for_event(&code)
                .detail(json!({ "code_expired_at": event.code_expired_at })),
        )
        .await;
    Ok(Json(event))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/event",
            get(list_events)
                .post(create_event)
                .put(update_event)
                .delete(delete_event),
        )
        .route("/event/{code}", get(get_event))
        .route("/event/{code}/expire", post(expire_event))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use checkin_core::organization::CreateOrganizationRequest;

    use crate::routes::test_support::{admin_token, build_state, json_request, read_json};
    use crate::state::AppState;

    async fn seed_organization(state: &AppState) {
        state
            .organizations()
            .create(CreateOrganizationRequest {
                organization_code: "awskrug".to_string(),
                organization_name: "AWSKRUG".to_string(),
                logo_url: None,
                event_version: vec!["2024".to_string(), "2025".to_string()],
            })
            .await
            .unwrap();
    }

    fn event_body(version: Option<&str>) -> Value {
        let start = Utc::now() - Duration::hours(1);
        let mut body = json!({
            "organization_code": "awskrug",
            "event_name": "Community Day",
            "event_date_time": start,
            "code_expired_at": start + Duration::hours(6),
        });
        if let Some(version) = version {
            body["event_version"] = json!(version);
        }
        body
    }

    #[tokio::test]
    async fn create_sets_code_qr_url_and_default_version() {
        let (state, _tmp) = build_state().await;
        seed_organization(&state).await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/event", Some(&token), Some(event_body(None))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = read_json(response).await;
        let code = created["event_code"].as_str().unwrap().to_string();
        assert_eq!(created["event_version"], "2024");
        assert_eq!(
            created["qr_url"],
            format!("http://kiosk.test/?c={}", code)
        );

        let response = app
            .clone()
            .oneshot(json_request("GET", &format!("/event/{}", code), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["event_name"], "Community Day");

        let response = app
            .oneshot(json_request(
                "GET",
                "/event?organization_code=awskrug",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn foreign_version_is_rejected() {
        let (state, _tmp) = build_state().await;
        seed_organization(&state).await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/event",
                Some(&token),
                Some(event_body(Some("1999"))),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["kind"], "invalid_version");
    }

    #[tokio::test]
    async fn update_expire_and_delete() {
        let (state, _tmp) = build_state().await;
        seed_organization(&state).await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/event", Some(&token), Some(event_body(None))))
            .await
            .unwrap();
        let code = read_json(response).await["event_code"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/event",
                Some(&token),
                Some(json!({ "event_code": code, "event_name": "Renamed", "event_version": "2025" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = read_json(response).await;
        assert_eq!(updated["event_name"], "Renamed");
        assert_eq!(updated["event_version"], "2025");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/event/{}/expire", code),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let expired_at: chrono::DateTime<Utc> =
            serde_json::from_value(read_json(response).await["code_expired_at"].clone()).unwrap();
        assert!(expired_at <= Utc::now());

        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                "/event",
                Some(&token),
                Some(json!({ "event_code": code })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(json_request("GET", &format!("/event/{}", code), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
