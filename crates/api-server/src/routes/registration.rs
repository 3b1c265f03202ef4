//! Registration endpoints, including multipart bulk import

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use checkin_core::registration::{
    AttendeeKey, CreateRegistrationRequest, ImportSummary, Registration, SpreadsheetFormat,
    UpdateRegistrationRequest,
};
use checkin_core::upload::MAX_UPLOAD_BYTES;
use checkin_core::Error;

use crate::{
    audit::AuditEvent,
    auth::AdminSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Room for multipart framing around a maximum-size file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
struct EventQuery {
    event_code: String,
}

async fn list_registrations(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<EventQuery>,
) -> ApiResult<Json<Vec<Registration>>> {
    Ok(Json(state.registrations().list(&query.event_code).await?))
}

async fn add_registration(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateRegistrationRequest>,
) -> ApiResult<(StatusCode, Json<Registration>)> {
    let created = state.registrations().add(req).await?;
    state
        .record(
            AuditEvent::new(session.username, "registration.create")
                .for_event(&created.event_code)
                .target(&created.phone),
        )
        .await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_registration(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<UpdateRegistrationRequest>,
) -> ApiResult<Json<Registration>> {
    let updated = state.registrations().update(req).await?;
    state
        .record(
            AuditEvent::new(session.username, "registration.update")
                .for_event(&updated.event_code)
                .target(&updated.phone),
        )
        .await;
    Ok(Json(updated))
}

async fn delete_registration(
    State(state): State<AppState>,
    session: AdminSession,
    Json(key): Json<AttendeeKey>,
) -> ApiResult<StatusCode> {
    state
        .registrations()
        .delete(&key.event_code, &key.phone)
        .await?;
    state
        .record(
            AuditEvent::new(session.username, "registration.delete")
                .for_event(key.event_code)
                .target(key.phone),
        )
        .await;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(err: impl std::fmt::Display) -> ApiError {
    ApiError(Error::InvalidFormat(format!("malformed multipart body: {}", err)))
}

/// POST /registration/upload - multipart fields `event_code` and `file`
async fn upload_registrations(
    State(state): State<AppState>,
    session: AdminSession,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportSummary>> {
    let mut event_code = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("event_code") => {
                event_code = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                let format = SpreadsheetFormat::detect(field.file_name(), field.content_type())?;
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some((format, bytes));
            }
            _ => {}
        }
    }

    let event_code = event_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("event_code field is required"))?;
    let (format, bytes) = upload.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::bad_request(format!(
            "file exceeds {} bytes",
            MAX_UPLOAD_BYTES
        )));
    }

    let summary = state
        .registrations()
        .bulk_import(&event_code, &bytes, format)
        .await?;
    state
        .record(
            AuditEvent::new(session.username, "registration.import")
                .for_event(&event_code)
                .detail(json!({
                    "rows_processed": summary.rows_processed,
                    "rows_skipped": summary.rows_skipped,
                })),
        )
        .await;
    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registration/list", get(list_registrations))
        .route(
            "/registration",
            post(add_registration)
                .put(update_registration)
                .delete(delete_registration),
        )
        .route(
            "/registration/upload",
            post(upload_registrations)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tower::ServiceExt;

    use checkin_core::event::Event;

    use crate::routes::test_support::{admin_token, build_state, json_request, read_json};
    use crate::state::AppState;

    async fn seed_event(state: &AppState) -> Event {
        state
            .organizations()
            .create(checkin_core::organization::CreateOrganizationRequest {
                organization_code: "awskrug".to_string(),
                organization_name: "AWSKRUG".to_string(),
                logo_url: None,
                event_version: vec![],
            })
            .await
            .unwrap();
        let now = Utc::now();
        state
            .events()
            .create(checkin_core::event::CreateEventRequest {
                organization_code: "awskrug".to_string(),
                event_name: "Meetup".to_string(),
                description: String::new(),
                event_date_time: now,
                code_expired_at: now + Duration::hours(3),
                event_version: None,
            })
            .await
            .unwrap()
    }

    fn multipart_request(token: &str, event_code: &str, csv: &str) -> Request<Body> {
        let boundary = "checkin-boundary";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"event_code\"\r\n\r\n\
             {event}\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"attendees.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --{b}--\r\n",
            b = boundary,
            event = event_code,
            csv = csv
        );
        Request::builder()
            .method("POST")
            .uri("/registration/upload")
            .header("Authorization", format!("Bearer {}", token))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn add_with_store_key_names_then_conflict() {
        let (state, _tmp) = build_state().await;
        let event = seed_event(&state).await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);
        let body = json!({
            "partition_key": event.event_code,
            "sort_key": "010-1234-5678",
            "name": "Kim",
            "email": "kim@example.com"
        });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/registration", Some(&token), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["phone"], "01012345678");

        let response = app
            .clone()
            .oneshot(json_request("POST", "/registration", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(json_request(
                "GET",
                &format!("/registration/list?event_code={}", event.event_code),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_registration() {
        let (state, _tmp) = build_state().await;
        let event = seed_event(&state).await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);

        app.clone()
            .oneshot(json_request(
                "POST",
                "/registration",
                Some(&token),
                Some(json!({ "event_code": event.event_code, "phone": "0100", "name": "Kim" })),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/registration",
                Some(&token),
                Some(json!({ "event_code": event.event_code, "phone": "0100", "name": "Lee" })),
            ))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["name"], "Lee");

        let key = json!({ "event_code": event.event_code, "phone": "0100" });
        let response = app
            .clone()
            .oneshot(json_request("DELETE", "/registration", Some(&token), Some(key.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(json_request("DELETE", "/registration", Some(&token), Some(key)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn multipart_upload_reports_processed_rows() {
        let (state, _tmp) = build_state().await;
        let event = seed_event(&state).await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);

        let csv = "visitor_name,visitor_mobile,visitor_email\n\
                   Kim,010-0000-0001,kim@example.com\n\
                   Kim again,01000000001,\n\
                   Lee,010-0000-0002,";
        let response = app
            .oneshot(multipart_request(&token, &event.event_code, csv))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let summary = read_json(response).await;
        assert_eq!(summary["rows_processed"], 2);
        assert_eq!(summary["rows_skipped"], 1);
        assert_eq!(summary["errors"][0]["row"], 3);
    }
}
