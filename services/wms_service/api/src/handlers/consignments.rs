//! Consignment intake and query handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use shared_auth::AuthUser;
use shared_error::AppError;
use shared_types::{Page, PageParams};
use wms_service_core::dto::{
    ConsignmentDetailResponse, ConsignmentFilter, ConsignmentResponse, ReceiveConsignmentRequest,
};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Receive a consignment and create its stock items
#[utoipa::path(
    post,
    path = "/api/v1/wms/consignments",
    tag = "consignments",
    request_body = ReceiveConsignmentRequest,
    responses(
        (status = 201, body = ConsignmentDetailResponse),
        (status = 400, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn receive_consignment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ReceiveConsignmentRequest>,
) -> Result<(StatusCode, Json<ConsignmentDetailResponse>), AppError> {
    user.ensure_tenant(request.tenant_id)?;
    let detail = state
        .consignment_service
        .receive_consignment(&user.context(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConsignmentsParams {
    pub status: Option<wms_service_core::domains::consignment::ConsignmentStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// List consignments
#[utoipa::path(
    get,
    path = "/api/v1/wms/consignments",
    tag = "consignments",
    params(ConsignmentFilter),
    responses((status = 200, description = "Paginated consignments")),
    security(("bearer_auth" = []))
)]
pub async fn list_consignments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListConsignmentsParams>,
) -> Result<Json<Page<ConsignmentResponse>>, AppError> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let filter = ConsignmentFilter {
        status: params.status,
    };
    let consignments = state
        .consignment_queries
        .list_consignments(&user.context(), filter, page)
        .await?;
    Ok(Json(consignments))
}

pub fn create_consignment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/wms/consignments",
            post(receive_consignment).get(list_consignments),
        )
}
