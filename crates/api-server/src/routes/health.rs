//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    fuzzy_phone_match: bool,
    phone_hashing: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: config.environment.clone(),
        fuzzy_phone_match: config.fuzzy_phone_match,
        phone_hashing: config.phone_hash_salt.is_some(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::routes::test_support::{build_state, json_request, read_json};

    #[tokio::test]
    async fn health_is_public() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let response = app
            .oneshot(json_request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payload = read_json(response).await;
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["fuzzy_phone_match"], false);
        assert_eq!(payload["phone_hashing"], false);
    }
}
