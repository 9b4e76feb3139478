//! Location command and query handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use shared_auth::AuthUser;
use shared_error::AppError;
use shared_types::{Page, PageParams};
use wms_service_core::domains::location::LocationType;
use wms_service_core::dto::{
    AssignLocationsFefoRequest, BlockLocationRequest, CreateLocationRequest,
    FefoAssignmentResponse, LocationDetailResponse, LocationFilter, LocationResponse,
    LocationTreeNode, UpdateLocationStatusRequest,
};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Create a new location
#[utoipa::path(
    post,
    path = "/api/v1/wms/locations",
    tag = "locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, body = LocationResponse),
        (status = 400, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_location(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<LocationResponse>), AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let location = state.location_service.create_location(&user.context(), request).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Drive the location status machine
#[utoipa::path(
    put,
    path = "/api/v1/wms/locations/{id}/status",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = UpdateLocationStatusRequest,
    responses(
        (status = 200, body = LocationResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_location_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(location_id): Path<Uuid>,
    Json(request): Json<UpdateLocationStatusRequest>,
) -> Result<Json<LocationResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let location = state
        .location_service
        .update_status(&user.context(), location_id, request)
        .await?;
    Ok(Json(location))
}

/// Block a location with a reason
#[utoipa::path(
    post,
    path = "/api/v1/wms/locations/{id}/block",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = BlockLocationRequest,
    responses(
        (status = 200, body = LocationResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn block_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(location_id): Path<Uuid>,
    Json(request): Json<BlockLocationRequest>,
) -> Result<Json<LocationResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let location = state.location_service.block(&user.context(), location_id, request).await?;
    Ok(Json(location))
}

/// Return a blocked location to service
#[utoipa::path(
    post,
    path = "/api/v1/wms/locations/{id}/unblock",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, body = LocationResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unblock_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(location_id): Path<Uuid>,
) -> Result<Json<LocationResponse>, AppError> {
    let location = state.location_service.unblock(&user.context(), location_id).await?;
    Ok(Json(location))
}

/// Reserve an available location
#[utoipa::path(
    post,
    path = "/api/v1/wms/locations/{id}/reserve",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, body = LocationResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn reserve_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(location_id): Path<Uuid>,
) -> Result<Json<LocationResponse>, AppError> {
    let location = state.location_service.reserve(&user.context(), location_id).await?;
    Ok(Json(location))
}

/// Release a reserved location
#[utoipa::path(
    post,
    path = "/api/v1/wms/locations/{id}/release",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, body = LocationResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn release_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(location_id): Path<Uuid>,
) -> Result<Json<LocationResponse>, AppError> {
    let location = state.location_service.release(&user.context(), location_id).await?;
    Ok(Json(location))
}

/// Assign stock items to BIN locations, earliest expiry first
#[utoipa::path(
    post,
    path = "/api/v1/wms/locations/assign-fefo",
    tag = "locations",
    request_body = AssignLocationsFefoRequest,
    responses(
        (status = 200, body = FefoAssignmentResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_locations_fefo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AssignLocationsFefoRequest>,
) -> Result<Json<FefoAssignmentResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let plan = state
        .location_service
        .assign_locations_fefo(&user.context(), request)
        .await?;
    Ok(Json(plan))
}

/// Get a location with its hierarchy path
#[utoipa::path(
    get,
    path = "/api/v1/wms/locations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, body = LocationDetailResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_location(
    State(state): State<AppState>,
    user: AuthUser,
    Path(location_id): Path<Uuid>,
) -> Result<Json<LocationDetailResponse>, AppError> {
    let detail = state.location_queries.get_location(&user.context(), location_id).await?;
    Ok(Json(detail))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLocationsParams {
    pub location_type: Option<LocationType>,
    pub status: Option<wms_service_core::LocationStatus>,
    pub parent_location_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// List locations with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/wms/locations",
    tag = "locations",
    params(LocationFilter),
    responses((status = 200, description = "Paginated locations")),
    security(("bearer_auth" = []))
)]
pub async fn list_locations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListLocationsParams>,
) -> Result<Json<Page<LocationResponse>>, AppError> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let filter = LocationFilter {
        location_type: params.location_type,
        status: params.status,
        parent_location_id: params.parent_location_id,
    };
    let locations = state
        .location_queries
        .list_locations(&user.context(), filter, page)
        .await?;
    Ok(Json(locations))
}

/// List AVAILABLE locations
#[utoipa::path(
    get,
    path = "/api/v1/wms/locations/available",
    tag = "locations",
    responses((status = 200, body = Vec<LocationResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn available_locations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<LocationResponse>>, AppError> {
    let locations = state.location_queries.available_locations(&user.context()).await?;
    Ok(Json(locations))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyParams {
    pub level: Option<LocationType>,
}

/// Reconstruct the location hierarchy
#[utoipa::path(
    get,
    path = "/api/v1/wms/locations/hierarchy",
    tag = "locations",
    responses((status = 200, body = Vec<LocationTreeNode>)),
    security(("bearer_auth" = []))
)]
pub async fn location_hierarchy(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HierarchyParams>,
) -> Result<Json<Vec<LocationTreeNode>>, AppError> {
    let tree = state
        .location_queries
        .location_hierarchy(&user.context(), params.level)
        .await?;
    Ok(Json(tree))
}

pub fn create_location_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/wms/locations", post(create_location).get(list_locations))
        .route("/api/v1/wms/locations/available", get(available_locations))
        .route("/api/v1/wms/locations/hierarchy", get(location_hierarchy))
        .route("/api/v1/wms/locations/assign-fefo", post(assign_locations_fefo))
        .route("/api/v1/wms/locations/{id}", get(get_location))
        .route("/api/v1/wms/locations/{id}/status", put(update_location_status))
        .route("/api/v1/wms/locations/{id}/block", post(block_location))
        .route("/api/v1/wms/locations/{id}/unblock", post(unblock_location))
        .route("/api/v1/wms/locations/{id}/reserve", post(reserve_location))
        .route("/api/v1/wms/locations/{id}/release", post(release_location))
}
