//! Stock movement workflow handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use shared_auth::AuthUser;
use shared_error::AppError;
use wms_service_core::dto::{
    CancelStockMovementRequest, CreateStockMovementRequest, StockMovementResponse,
};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Initiate a stock movement
#[utoipa::path(
    post,
    path = "/api/v1/wms/stock-movements",
    tag = "stock-movements",
    request_body = CreateStockMovementRequest,
    responses(
        (status = 201, body = StockMovementResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_movement(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateStockMovementRequest>,
) -> Result<(StatusCode, Json<StockMovementResponse>), AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let movement = state.movement_service.create_movement(&user.context(), request).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Complete a movement, applying its capacity effects
#[utoipa::path(
    post,
    path = "/api/v1/wms/stock-movements/{id}/complete",
    tag = "stock-movements",
    params(("id" = Uuid, Path, description = "Movement ID")),
    responses(
        (status = 200, body = StockMovementResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_movement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movement_id): Path<Uuid>,
) -> Result<Json<StockMovementResponse>, AppError> {
    let movement = state
        .movement_service
        .complete_movement(&user.context(), movement_id)
        .await?;
    Ok(Json(movement))
}

/// Cancel an in-flight movement
#[utoipa::path(
    post,
    path = "/api/v1/wms/stock-movements/{id}/cancel",
    tag = "stock-movements",
    params(("id" = Uuid, Path, description = "Movement ID")),
    request_body = CancelStockMovementRequest,
    responses(
        (status = 200, body = StockMovementResponse),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_movement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(movement_id): Path<Uuid>,
    Json(request): Json<CancelStockMovementRequest>,
) -> Result<Json<StockMovementResponse>, AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let movement = state
        .movement_service
        .cancel_movement(&user.context(), movement_id, request)
        .await?;
    Ok(Json(movement))
}

pub fn create_stock_movement_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/wms/stock-movements", post(create_movement))
        .route("/api/v1/wms/stock-movements/{id}/complete", post(complete_movement))
        .route("/api/v1/wms/stock-movements/{id}/cancel", post(cancel_movement))
}
