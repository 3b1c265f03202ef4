//! Organization endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use checkin_core::organization::{
    CreateOrganizationRequest, Organization, UpdateOrganizationRequest,
};

use crate::{audit::AuditEvent, auth::AdminSession, error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
struct OrganizationKey {
    organization_code: String,
}

/// GET /organization/list
async fn list_organizations(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Json<Vec<Organization>>> {
    Ok(Json(state.organizations().list().await?))
}

/// GET /organization?organization_code=
async fn get_organization(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(key): Query<OrganizationKey>,
) -> ApiResult<Json<Organization>> {
    Ok(Json(state.organizations().get(&key.organization_code).await?))
}

async fn create_organization(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<CreateOrganizationRequest>,
) -> ApiResult<(StatusCode, Json<Organization>)> {
    let created = state.organizations().create(req).await?;
    state
        .record(
            AuditEvent::new(session.username, "organization.create")
                .target(&created.organization_code),
        )
        .await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_organization(
    State(state): State<AppState>,
    session: AdminSession,
    Json(req): Json<UpdateOrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    let updated = state.organizations().update(req).await?;
    state
        .record(
            AuditEvent::new(session.username, "organization.update")
                .target(&updated.organization_code)
                .detail(json!({ "event_version": updated.event_version })),
        )
        .await;
    Ok(Json(updated))
}

async fn delete_organization(
    State(state): State<AppState>,
    session: AdminSession,
    Json(key): Json<OrganizationKey>,
) -> ApiResult<StatusCode> {
    state
        .organizations()
        .delete(&key.organization_code)
        .await?;
    state
        .record(
            AuditEvent::new(session.username, "organization.delete")
                .target(key.organization_code),
        )
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/organization/list", get(list_organizations))
        .route(
            "/organization",
            get(get_organization)
                .post(create_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::{admin_token, build_state, json_request, read_json};

    #[tokio::test]
    async fn organization_lifecycle() {
        let (state, _tmp) = build_state().await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/organization",
                Some(&token),
                Some(json!({
                    "organization_code": "awskrug",
                    "organization_name": "AWSKRUG",
                    "event_version": ["2024", "2024", "2025"]
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["event_version"], json!(["2024", "2025"]));

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/organization",
                Some(&token),
                Some(json!({
                    "organization_code": "awskrug",
                    "organization_name": "AWS Korea User Group"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "GET",
                "/organization?organization_code=awskrug",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(
            read_json(response).await["organization_name"],
            "AWS Korea User Group"
        );

        let response = app
            .clone()
            .oneshot(json_request("GET", "/organization/list", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(json_request(
                "DELETE",
                "/organization",
                Some(&token),
                Some(json!({ "organization_code": "awskrug" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(json_request(
                "GET",
                "/organization?organization_code=awskrug",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_code_is_conflict_and_routes_need_session() {
        let (state, _tmp) = build_state().await;
        let token = admin_token(&state);
        let app = super::router().with_state(state);
        let body = json!({ "organization_code": "awskrug", "organization_name": "AWSKRUG" });

        let first = app
            .clone()
            .oneshot(json_request("POST", "/organization", Some(&token), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .clone()
            .oneshot(json_request("POST", "/organization", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let anonymous = app
            .oneshot(json_request("GET", "/organization/list", None, None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }
}
