//! Audit trail listing

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    audit::{AuditListQuery, AuditListResponse},
    auth::AdminSession,
    state::AppState,
};

/// GET /audit?offset=&limit=&event_code=&action= - newest first
async fn list_audit(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<AuditListQuery>,
) -> Json<AuditListResponse> {
    let (items, has_more) = state.audit().list_paginated(&query).await;
    let next_offset = has_more.then(|| query.offset.unwrap_or(0) + items.len());
    Json(AuditListResponse {
        items,
        has_more,
        next_offset,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/audit", get(list_audit))
}
