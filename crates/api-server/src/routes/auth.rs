//! Admin session endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    audit::AuditEvent,
    auth::{AdminSession, IssuedToken},
    error::ApiResult,
    state::AppState,
};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LogoutResponse {
    logged_out: bool,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<IssuedToken>> {
    let issued = state.auth().login(req.username.trim(), &req.password)?;
    state
        .record(AuditEvent::new(req.username.trim(), "auth.login"))
        .await;
    Ok(Json(issued))
}

/// Sessions are stateless; the console drops its token.
async fn logout(State(state): State<AppState>, session: AdminSession) -> Json<LogoutResponse> {
    state
        .record(AuditEvent::new(session.username, "auth.logout"))
        .await;
    Json(LogoutResponse { logged_out: true })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}
