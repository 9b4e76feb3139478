//! Restock request and threshold handlers
//!
//! Restock creation itself is event-driven (see the consumers module); the
//! HTTP surface covers the explicit lifecycle transitions and reads.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use shared_auth::AuthUser;
use shared_error::AppError;
use shared_types::{Page, PageParams};
use wms_service_core::dto::{
    MarkRestockSentRequest, RestockFilter, RestockRequestResponse, ThresholdResponse,
    UpsertThresholdRequest,
};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Record that a restock request was transmitted to D365
#[utoipa::path(
    post,
    path = "/api/v1/wms/restock-requests/{id}/send",
    tag = "restock",
    params(("id" = Uuid, Path, description = "Restock request ID")),
    request_body = MarkRestockSentRequest,
    responses(
        (status = 200, body = RestockRequestResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_sent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restock_request_id): Path<Uuid>,
    Json(request): Json<MarkRestockSentRequest>,
) -> Result<Json<RestockRequestResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let restock = state
        .restock_service
        .mark_sent(&user.context(), restock_request_id, request)
        .await?;
    Ok(Json(restock))
}

/// Mark a sent restock request fulfilled (idempotent)
#[utoipa::path(
    post,
    path = "/api/v1/wms/restock-requests/{id}/fulfill",
    tag = "restock",
    params(("id" = Uuid, Path, description = "Restock request ID")),
    responses(
        (status = 200, body = RestockRequestResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_fulfilled(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restock_request_id): Path<Uuid>,
) -> Result<Json<RestockRequestResponse>, AppError> {
    let restock = state
        .restock_service
        .mark_fulfilled(&user.context(), restock_request_id)
        .await?;
    Ok(Json(restock))
}

/// Cancel a non-fulfilled restock request
#[utoipa::path(
    post,
    path = "/api/v1/wms/restock-requests/{id}/cancel",
    tag = "restock",
    params(("id" = Uuid, Path, description = "Restock request ID")),
    responses(
        (status = 200, body = RestockRequestResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restock_request_id): Path<Uuid>,
) -> Result<Json<RestockRequestResponse>, AppError> {
    let restock = state.restock_service.cancel(&user.context(), restock_request_id).await?;
    Ok(Json(restock))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRestockParams {
    pub status: Option<wms_service_core::RestockStatus>,
    pub priority: Option<wms_service_core::RestockPriority>,
    pub product_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// List restock requests
#[utoipa::path(
    get,
    path = "/api/v1/wms/restock-requests",
    tag = "restock",
    params(RestockFilter),
    responses((status = 200, description = "Paginated restock requests")),
    security(("bearer_auth" = []))
)]
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListRestockParams>,
) -> Result<Json<Page<RestockRequestResponse>>, AppError> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let filter = RestockFilter {
        status: params.status,
        priority: params.priority,
        product_id: params.product_id,
    };
    let restocks = state.restock_service.list(&user.context(), filter, page).await?;
    Ok(Json(restocks))
}

/// Create or replace a stock level threshold
#[utoipa::path(
    put,
    path = "/api/v1/wms/thresholds",
    tag = "restock",
    request_body = UpsertThresholdRequest,
    responses(
        (status = 200, body = ThresholdResponse),
        (status = 400, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_threshold(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpsertThresholdRequest>,
) -> Result<Json<ThresholdResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let threshold = state.restock_service.upsert_threshold(&user.context(), request).await?;
    Ok(Json(threshold))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListThresholdsParams {
    pub product_id: Option<Uuid>,
}

/// List configured thresholds
#[utoipa::path(
    get,
    path = "/api/v1/wms/thresholds",
    tag = "restock",
    responses((status = 200, body = Vec<ThresholdResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_thresholds(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListThresholdsParams>,
) -> Result<Json<Vec<ThresholdResponse>>, AppError> {
    let thresholds = state
        .restock_service
        .list_thresholds(&user.context(), params.product_id)
        .await?;
    Ok(Json(thresholds))
}

pub fn create_restock_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/wms/restock-requests", get(list))
        .route("/api/v1/wms/restock-requests/{id}/send", post(mark_sent))
        .route("/api/v1/wms/restock-requests/{id}/fulfill", post(mark_fulfilled))
        .route("/api/v1/wms/restock-requests/{id}/cancel", post(cancel))
        .route("/api/v1/wms/thresholds", put(upsert_threshold).get(list_thresholds))
}
