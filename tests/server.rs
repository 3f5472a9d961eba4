//! HTTP API tests (run with `--features server`)

#![cfg(feature = "server")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use rolebit::server::{router, AppState, TEAM_HEADER, TMB_HEADER};
use rolebit::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn setup() -> (TempDir, Arc<Store>, Router) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(dir.path()).unwrap());
    store.create_team("t", "o").unwrap();
    store.add_member("t", "a", TeamMemberRole::Admin, Some(TEAM_MANAGE_ROLE)).unwrap();
    store.add_member("t", "m", TeamMemberRole::Member, None).unwrap();
    store.create_resource(ResourceType::App, "app", "t", "o").unwrap();
    store.create_resource(ResourceType::Dataset, "ds", "t", "o").unwrap();
    let app = router(AppState::new(store.clone()));
    (dir, store, app)
}

async fn call(app: &Router, method: Method, uri: &str, tmb: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(tmb) = tmb {
        req = req.header(TEAM_HEADER, "t").header(TMB_HEADER, tmb);
    }
    let req = match body {
        Some(b) => req
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

// ============================================================================
// Health and identity
// ============================================================================

#[tokio::test]
async fn health_needs_no_identity() {
    let (_dir, _store, app) = setup();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let (_dir, _store, app) = setup();
    let (status, _) = call(&app, Method::GET, "/team/permission", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn team_permission_reports_flags() {
    let (_dir, _store, app) = setup();
    let (status, body) = call(&app, Method::GET, "/team/permission", Some("a"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasManagePer"], true);
    assert_eq!(body["isOwner"], false);

    let (_, body) = call(&app, Method::GET, "/team/permission", Some("o"), None).await;
    assert_eq!(body["isOwner"], true);
    assert_eq!(body["hasAppCreatePer"], true);

    let (status, _) = call(&app, Method::GET, "/team/permission", Some("stranger"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Team collaborators
// ============================================================================

#[tokio::test]
async fn team_update_one_and_denial() {
    let (_dir, store, app) = setup();
    let (status, _) = call(
        &app,
        Method::POST,
        "/team/collaborator/updateOne",
        Some("a"),
        Some(json!({ "tmbId": "m", "permission": TEAM_WRITE_ROLE.bits() })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.find(ResourceType::Team, None, "t", &Principal::member("m")).unwrap(), Some(TEAM_WRITE_ROLE));

    let (status, body) = call(
        &app,
        Method::POST,
        "/team/collaborator/updateOne",
        Some("a"),
        Some(json!({ "tmbId": "m", "permission": TEAM_MANAGE_ROLE.bits() })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "no permission" }));
}

#[tokio::test]
async fn ambiguous_principal_is_bad_request() {
    let (_dir, _store, app) = setup();
    let (status, _) = call(
        &app,
        Method::POST,
        "/team/collaborator/updateOne",
        Some("a"),
        Some(json!({ "tmbId": "m", "groupId": "g", "permission": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn team_list_and_delete() {
    let (_dir, _store, app) = setup();
    let (status, body) = call(&app, Method::GET, "/team/collaborator/list", Some("m"), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert!(list.iter().any(|c| c["tmbId"] == "o" && c["isOwner"] == true));

    let (status, body) = call(&app, Method::DELETE, "/team/collaborator/delete?tmbId=a", Some("o"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = call(&app, Method::DELETE, "/team/collaborator/delete?tmbId=o", Some("a"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Apps and datasets
// ============================================================================

#[tokio::test]
async fn app_collaborators_round_trip() {
    let (_dir, _store, app) = setup();
    let (status, body) = call(
        &app,
        Method::POST,
        "/app/collaborator/update",
        Some("o"),
        Some(json!({ "appId": "app", "collaborators": [{ "tmbId": "m", "permission": 6 }, { "orgId": "x", "permission": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upserted"], 2);

    let (status, body) = call(&app, Method::GET, "/app/collaborator/list?appId=app", Some("o"), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.iter().any(|c| c["orgId"] == "x" && c["rolled"] == 4));

    let (status, _) = call(&app, Method::GET, "/app/collaborator/list?appId=app", Some("m"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::DELETE, "/app/collaborator/delete?appId=app&orgId=x", Some("o"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);
}

#[tokio::test]
async fn dataset_update_syncs() {
    let (_dir, store, app) = setup();
    store
        .update_resource_collaborators(
            ResourceType::Dataset,
            "ds",
            "t",
            "o",
            &[CollaboratorUpdate::new(&Principal::member("a"), READ_ROLE)],
            CollaboratorMode::Sync,
        )
        .unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        "/dataset/collaborator/update",
        Some("o"),
        Some(json!({ "datasetId": "ds", "collaborators": [{ "tmbId": "m", "permission": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    assert_eq!(store.find(ResourceType::Dataset, Some("ds"), "t", &Principal::member("a")).unwrap(), None);
}

#[tokio::test]
async fn change_owner_and_unknown_resource() {
    let (_dir, store, app) = setup();
    let (status, _) = call(
        &app,
        Method::POST,
        "/app/changeOwner",
        Some("o"),
        Some(json!({ "appId": "app", "ownerId": "m" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.owner_of(ResourceType::App, Some("app"), "t").unwrap().as_deref(), Some("m"));

    let (status, _) = call(&app, Method::GET, "/dataset/collaborator/list?datasetId=nope", Some("o"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
