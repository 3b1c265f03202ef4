//! Presigned upload URLs and the blob endpoint they point at

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    routing::{post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use checkin_core::registration::ImportSummary;
use checkin_core::upload::{event_code_from_key, PresignRequest, UploadTarget, MAX_UPLOAD_BYTES};

use crate::{audit::AuditEvent, auth::AdminSession, error::ApiResult, state::AppState};

const UPLOAD_ACTOR: &str = "presigned-upload";

/// POST /presigned-url - `{event_code, expiration?}` -> `{url, file_key, expires_in}`
async fn presigned_url(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<PresignRequest>,
) -> ApiResult<Json<UploadTarget>> {
    let target = state
        .uploads()
        .issue_upload_target(req.event_code.trim(), req.expiration, Utc::now())
        .await?;
    state
        .record(
            AuditEvent::new(session.username, "upload.presign")
                .for_event(req.event_code.trim())
                .target(&target.file_key),
        )
        .await;
    Ok(Json(target))
}

#[derive(Debug, Deserialize)]
struct BlobQuery {
    expires: i64,
    signature: String,
}

/// PUT /blob/{key}?expires=&signature= - authorized by the URL alone. A
/// stored object is imported into the event's registrations right away.
async fn put_blob(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BlobQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ImportSummary>> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let summary = state
        .uploads()
        .receive(
            &key,
            query.expires,
            &query.signature,
            content_type,
            &body,
            Utc::now(),
        )
        .await?;

    let mut event = AuditEvent::new(UPLOAD_ACTOR, "registration.import").target(&key);
    if let Some(event_code) = event_code_from_key(&key) {
        event = event.for_event(event_code);
    }
    state
        .record(event.detail(json!({
            "rows_processed": summary.rows_processed,
            "rows_skipped": summary.rows_skipped,
        })))
        .await;
    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presigned-url", post(presigned_url))
        .route(
            "/blob/{*key}",
            put(put_blob).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
