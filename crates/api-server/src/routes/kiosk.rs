//! Public self check-in used by the kiosk page

use axum::{extract::State, routing::post, Json, Router};

use checkin_core::checkin::{CheckInResult, KioskCheckInRequest};

use crate::{audit::AuditEvent, error::ApiResult, state::AppState};

const KIOSK_ACTOR: &str = "kiosk";

/// POST /check - `{phone, event_code}` -> `{name, count}`. Repeat check-ins
/// succeed with the same payload.
async fn self_check_in(
    State(state): State<AppState>,
    Json(req): Json<KioskCheckInRequest>,
) -> ApiResult<Json<CheckInResult>> {
    let outcome = state
        .checkins()
        .check_in(req.event_code.trim(), &req.phone)
        .await?;

    if outcome.created {
        state
            .record(
                AuditEvent::new(KIOSK_ACTOR, "checkin.kiosk")
                    .for_event(&outcome.checkin.event_code)
                    .target(&outcome.checkin.phone),
            )
            .await;
    }
    Ok(Json(outcome.result()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/check", post(self_check_in))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tower::ServiceExt;

    use checkin_core::event::{CreateEventRequest, UpdateEventRequest};
    use checkin_core::organization::CreateOrganizationRequest;
    use checkin_core::registration::CreateRegistrationRequest;

    use crate::audit::AuditListQuery;
    use crate::routes::test_support::{build_state, json_request, read_json};
    use crate::state::AppState;

    async fn seed(state: &AppState) -> String {
        state
            .organizations()
            .create(CreateOrganizationRequest {
                organization_code: "awskrug".to_string(),
                organization_name: "AWSKRUG".to_string(),
                logo_url: None,
                event_version: vec![],
            })
            .await
            .unwrap();
        let now = Utc::now();
        let event = state
            .events()
            .create(CreateEventRequest {
                organization_code: "awskrug".to_string(),
                event_name: "Meetup".to_string(),
                description: String::new(),
                event_date_time: now - Duration::hours(1),
                code_expired_at: now + Duration::hours(1),
                event_version: None,
            })
            .await
            .unwrap();
        state
            .registrations()
            .add(CreateRegistrationRequest {
                event_code: event.event_code.clone(),
                phone: "0100000001".to_string(),
                name: "Kim".to_string(),
                email: None,
            })
            .await
            .unwrap();
        event.event_code
    }

    #[tokio::test]
    async fn self_check_in_is_public_and_idempotent() {
        let (state, _tmp) = build_state().await;
        let code = seed(&state).await;
        let app = super::router().with_state(state.clone());
        let body = json!({ "phone": "010-000-0001", "event_code": code });

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/check", None, Some(body.clone())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(read_json(response).await, json!({ "name": "Kim", "count": 1 }));
        }

        assert_eq!(state.checkins().list(&code).await.unwrap().len(), 1);
        let query = AuditListQuery {
            action: Some("checkin.kiosk".to_string()),
            ..Default::default()
        };
        assert_eq!(state.audit().list_paginated(&query).await.0.len(), 1);
    }

    #[tokio::test]
    async fn kiosk_distinguishes_unregistered_from_expired() {
        let (state, _tmp) = build_state().await;
        let code = seed(&state).await;
        let app = super::router().with_state(state.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/check",
                None,
                Some(json!({ "phone": "0109999999", "event_code": code })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["kind"], "not_registered");

        let start = Utc::now() - Duration::hours(2);
        state
            .events()
            .update(UpdateEventRequest {
                event_code: code.clone(),
                organization_code: None,
                event_name: None,
                description: None,
                event_date_time: Some(start),
                code_expired_at: Some(start + Duration::minutes(30)),
                event_version: None,
            })
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/check",
                None,
                Some(json!({ "phone": "0100000001", "event_code": code })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GONE);
        assert_eq!(read_json(response).await["kind"], "expired");

        let response = app
            .oneshot(json_request(
                "POST",
                "/check",
                None,
                Some(json!({ "phone": "0100000001", "event_code": "test" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn concurrent_kiosk_requests_record_one_checkin() {
        let (state, _tmp) = build_state().await;
        let code = seed(&state).await;
        let app = super::router().with_state(state.clone());
        let body = json!({ "phone": "0100000001", "event_code": code });

        let requests = (0..12).map(|_| {
            app.clone()
                .oneshot(json_request("POST", "/check", None, Some(body.clone())))
        });
        let responses = futures::future::join_all(requests).await;

        for response in responses {
            assert_eq!(response.unwrap().status(), StatusCode::OK);
        }
        assert_eq!(state.checkins().list(&code).await.unwrap().len(), 1);
    }
}
