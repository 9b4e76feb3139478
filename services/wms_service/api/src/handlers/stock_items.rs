//! Stock item command and query handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use shared_auth::AuthUser;
use shared_error::AppError;
use wms_service_core::domains::stock_item::StockClassification;
use wms_service_core::dto::{
    AdjustStockQuantityRequest, ExpiringStockQuery, StockExpirationCheckResponse,
    StockItemDetailResponse, StockItemFilter, StockItemResponse, StockLevelResponse,
    UpdateAllocationRequest, UpdateExpirationDateRequest,
};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Update the expiration date of a stock item and reclassify it
#[utoipa::path(
    put,
    path = "/api/v1/wms/stock-items/{id}/expiration",
    tag = "stock-items",
    params(("id" = Uuid, Path, description = "Stock item ID")),
    request_body = UpdateExpirationDateRequest,
    responses(
        (status = 200, body = StockItemResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_expiration_date(
    State(state): State<AppState>,
    user: AuthUser,
    Path(stock_item_id): Path<Uuid>,
    Json(request): Json<UpdateExpirationDateRequest>,
) -> Result<Json<StockItemResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let item = state
        .stock_item_service
        .update_expiration_date(&user.context(), stock_item_id, request)
        .await?;
    Ok(Json(item))
}

/// Set the absolute quantity of a stock item
#[utoipa::path(
    put,
    path = "/api/v1/wms/stock-items/{id}/quantity",
    tag = "stock-items",
    params(("id" = Uuid, Path, description = "Stock item ID")),
    request_body = AdjustStockQuantityRequest,
    responses(
        (status = 200, body = StockItemResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn adjust_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(stock_item_id): Path<Uuid>,
    Json(request): Json<AdjustStockQuantityRequest>,
) -> Result<Json<StockItemResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let item = state
        .stock_item_service
        .adjust_quantity(&user.context(), stock_item_id, request)
        .await?;
    Ok(Json(item))
}

/// Set the allocated quantity of a stock item
#[utoipa::path(
    put,
    path = "/api/v1/wms/stock-items/{id}/allocation",
    tag = "stock-items",
    params(("id" = Uuid, Path, description = "Stock item ID")),
    request_body = UpdateAllocationRequest,
    responses(
        (status = 200, body = StockItemResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_allocation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(stock_item_id): Path<Uuid>,
    Json(request): Json<UpdateAllocationRequest>,
) -> Result<Json<StockItemResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let item = state
        .stock_item_service
        .update_allocation(&user.context(), stock_item_id, request)
        .await?;
    Ok(Json(item))
}

/// Get a stock item enriched with product and location metadata
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items/{id}",
    tag = "stock-items",
    params(("id" = Uuid, Path, description = "Stock item ID")),
    responses(
        (status = 200, body = StockItemDetailResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_stock_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(stock_item_id): Path<Uuid>,
) -> Result<Json<StockItemDetailResponse>, AppError> {
    let detail = state.stock_queries.get_stock_item(&user.context(), stock_item_id).await?;
    Ok(Json(detail))
}

/// List stock items with filters
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items",
    tag = "stock-items",
    params(StockItemFilter),
    responses((status = 200, body = Vec<StockItemResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_stock_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<StockItemFilter>,
) -> Result<Json<Vec<StockItemResponse>>, AppError> {
    let items = state.stock_queries.list_stock_items(&user.context(), filter).await?;
    Ok(Json(items))
}

/// Stock items carrying a given classification
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items/classification/{classification}",
    tag = "stock-items",
    params(("classification" = StockClassification, Path)),
    responses((status = 200, body = Vec<StockItemResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn stock_by_classification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(classification): Path<StockClassification>,
) -> Result<Json<Vec<StockItemResponse>>, AppError> {
    let items = state
        .stock_queries
        .stock_by_classification(&user.context(), classification)
        .await?;
    Ok(Json(items))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FefoItemsParams {
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
}

/// Pickable stock of a product in FEFO order
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items/fefo",
    tag = "stock-items",
    responses((status = 200, body = Vec<StockItemResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn fefo_stock_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<FefoItemsParams>,
) -> Result<Json<Vec<StockItemResponse>>, AppError> {
    let items = state
        .stock_queries
        .fefo_stock_items(&user.context(), params.product_id, params.location_id)
        .await?;
    Ok(Json(items))
}

/// Stock expiring within a window
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items/expiring",
    tag = "stock-items",
    params(ExpiringStockQuery),
    responses((status = 200, body = Vec<StockItemResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn expiring_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ExpiringStockQuery>,
) -> Result<Json<Vec<StockItemResponse>>, AppError> {
    let items = state.stock_queries.expiring_stock(&user.context(), query).await?;
    Ok(Json(items))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationCheckParams {
    pub product_id: Uuid,
    pub location_id: Uuid,
}

/// Expiration summary for a (product, location) pair
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items/expiration-check",
    tag = "stock-items",
    responses((status = 200, body = StockExpirationCheckResponse)),
    security(("bearer_auth" = []))
)]
pub async fn check_stock_expiration(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ExpirationCheckParams>,
) -> Result<Json<StockExpirationCheckResponse>, AppError> {
    let check = state
        .stock_queries
        .check_stock_expiration(&user.context(), params.product_id, params.location_id)
        .await?;
    Ok(Json(check))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelParams {
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
}

/// Current stock level of a product against its thresholds
#[utoipa::path(
    get,
    path = "/api/v1/wms/stock-items/levels",
    tag = "stock-items",
    responses((status = 200, body = StockLevelResponse)),
    security(("bearer_auth" = []))
)]
pub async fn stock_levels(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StockLevelParams>,
) -> Result<Json<StockLevelResponse>, AppError> {
    let level = state
        .stock_queries
        .stock_levels(&user.context(), params.product_id, params.location_id)
        .await?;
    Ok(Json(level))
}

pub fn create_stock_item_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/wms/stock-items", get(list_stock_items))
        .route("/api/v1/wms/stock-items/fefo", get(fefo_stock_items))
        .route("/api/v1/wms/stock-items/expiring", get(expiring_stock))
        .route("/api/v1/wms/stock-items/expiration-check", get(check_stock_expiration))
        .route("/api/v1/wms/stock-items/levels", get(stock_levels))
        .route(
            "/api/v1/wms/stock-items/classification/{classification}",
            get(stock_by_classification),
        )
        .route("/api/v1/wms/stock-items/{id}", get(get_stock_item))
        .route("/api/v1/wms/stock-items/{id}/expiration", put(update_expiration_date))
        .route("/api/v1/wms/stock-items/{id}/quantity", put(adjust_quantity))
        .route("/api/v1/wms/stock-items/{id}/allocation", put(update_allocation))
}
