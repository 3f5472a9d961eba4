//! HTTP API over the collaborator flows
//!
//! The operator is identified by the `x-team-id` and `x-tmb-id` headers, which an
//! authenticating gateway sets. Requests without them are rejected with 401.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::Store;
use crate::error::RolebitError;
use crate::principal::{Principal, PrincipalIds};
use crate::record::{Collaborator, ResourceType};
use crate::team::TeamPermission;
use crate::write::{CollaboratorMode, CollaboratorUpdate, SyncOutcome};

pub const TEAM_HEADER: &str = "x-team-id";
pub const TMB_HEADER: &str = "x-tmb-id";

// ============================================================================
// App State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl From<RolebitError> for ApiError {
    fn from(e: RolebitError) -> Self {
        let status = match &e {
            RolebitError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RolebitError::NotFound(_) => StatusCode::NOT_FOUND,
            RolebitError::Forbidden => StatusCode::FORBIDDEN,
            RolebitError::Config(_) | RolebitError::Storage(_) => {
                tracing::error!(error = %e, "request failed");
                return ApiError(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string());
            }
        };
        ApiError(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Identity
// ============================================================================

/// Operator identity from gateway headers
#[derive(Debug, Clone)]
pub struct Identity {
    pub team_id: String,
    pub tmb_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match (header(TEAM_HEADER), header(TMB_HEADER)) {
            (Some(team_id), Some(tmb_id)) => Ok(Identity { team_id, tmb_id }),
            _ => Err(ApiError(StatusCode::UNAUTHORIZED, "missing identity".to_string())),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    deleted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceQuery {
    #[serde(alias = "appId", alias = "datasetId")]
    resource_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceDeleteQuery {
    #[serde(alias = "appId", alias = "datasetId")]
    resource_id: String,
    #[serde(flatten)]
    ids: PrincipalIds,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCollaboratorsBody {
    #[serde(alias = "appId", alias = "datasetId")]
    resource_id: String,
    collaborators: Vec<CollaboratorUpdate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeOwnerBody {
    #[serde(alias = "appId", alias = "datasetId")]
    resource_id: String,
    owner_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn team_permission(State(state): State<AppState>, id: Identity) -> ApiResult<TeamPermission> {
    if state.store.member_role(&id.team_id, &id.tmb_id)?.is_none() {
        return Err(RolebitError::Forbidden.into());
    }
    let p = state
        .store
        .member_permission(ResourceType::Team, None, &id.team_id, &id.tmb_id, &[], &[])?;
    Ok(Json(TeamPermission::new(Some(p.value()), p.is_owner())))
}

async fn team_list(State(state): State<AppState>, id: Identity) -> ApiResult<Vec<Collaborator>> {
    let list = state
        .store
        .list_collaborators(ResourceType::Team, None, &id.team_id, &id.tmb_id)?;
    Ok(Json(list))
}

async fn team_update_one(
    State(state): State<AppState>,
    id: Identity,
    Json(req): Json<CollaboratorUpdate>,
) -> Result<StatusCode, ApiError> {
    let principal = req.principal()?;
    state
        .store
        .update_team_collaborator(&id.team_id, &id.tmb_id, &principal, req.permission)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn team_delete(
    State(state): State<AppState>,
    id: Identity,
    Query(ids): Query<PrincipalIds>,
) -> ApiResult<DeletedResponse> {
    let principal = Principal::try_from(&ids)?;
    let deleted = state
        .store
        .remove_team_collaborator(&id.team_id, &id.tmb_id, &principal)?;
    Ok(Json(DeletedResponse { deleted }))
}

async fn resource_list(
    rt: ResourceType,
    state: AppState,
    id: Identity,
    q: ResourceQuery,
) -> ApiResult<Vec<Collaborator>> {
    let list = state
        .store
        .list_collaborators(rt, Some(&q.resource_id), &id.team_id, &id.tmb_id)?;
    Ok(Json(list))
}

async fn resource_update(
    rt: ResourceType,
    state: AppState,
    id: Identity,
    req: UpdateCollaboratorsBody,
) -> ApiResult<SyncOutcome> {
    let outcome = state.store.update_resource_collaborators(
        rt,
        &req.resource_id,
        &id.team_id,
        &id.tmb_id,
        &req.collaborators,
        CollaboratorMode::for_resource(rt),
    )?;
    Ok(Json(outcome))
}

async fn resource_delete(
    rt: ResourceType,
    state: AppState,
    id: Identity,
    q: ResourceDeleteQuery,
) -> ApiResult<DeletedResponse> {
    let principal = Principal::try_from(&q.ids)?;
    let deleted = state
        .store
        .remove_resource_collaborator(rt, &q.resource_id, &id.team_id, &id.tmb_id, &principal)?;
    Ok(Json(DeletedResponse { deleted }))
}

async fn resource_change_owner(
    rt: ResourceType,
    state: AppState,
    id: Identity,
    req: ChangeOwnerBody,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .change_owner(rt, &req.resource_id, &id.team_id, &id.tmb_id, &req.owner_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Collaborator routes shared by apps and datasets
fn resource_routes(rt: ResourceType) -> Router<AppState> {
    Router::new()
        .route(
            "/collaborator/list",
            get(move |State(s): State<AppState>, id: Identity, Query(q): Query<ResourceQuery>| {
                resource_list(rt, s, id, q)
            }),
        )
        .route(
            "/collaborator/update",
            post(move |State(s): State<AppState>, id: Identity, Json(b): Json<UpdateCollaboratorsBody>| {
                resource_update(rt, s, id, b)
            }),
        )
        .route(
            "/collaborator/delete",
            delete(move |State(s): State<AppState>, id: Identity, Query(q): Query<ResourceDeleteQuery>| {
                resource_delete(rt, s, id, q)
            }),
        )
        .route(
            "/changeOwner",
            post(move |State(s): State<AppState>, id: Identity, Json(b): Json<ChangeOwnerBody>| {
                resource_change_owner(rt, s, id, b)
            }),
        )
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health))
        // Team
        .route("/team/permission", get(team_permission))
        .route("/team/collaborator/list", get(team_list))
        .route("/team/collaborator/updateOne", post(team_update_one))
        .route("/team/collaborator/delete", delete(team_delete))
        // Apps and datasets
        .nest("/app", resource_routes(ResourceType::App))
        .nest("/dataset", resource_routes(ResourceType::Dataset))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
