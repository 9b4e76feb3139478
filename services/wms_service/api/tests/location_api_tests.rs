//! HTTP-level tests for the location endpoints with mocked services
//!
//! Covers the transport mapping of the security context: missing or foreign
//! tenants must be rejected before any service call happens.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use mockall::mock;
use tower::ServiceExt;
use uuid::Uuid;

use shared_jwt::Claims;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_api::state::AppState;
use wms_service_core::domains::location::LocationType;
use wms_service_core::domains::stock_item::StockClassification;
use wms_service_core::dto::*;
use wms_service_core::services::{
    ConsignmentQueries, ConsignmentService, LocationQueries, LocationService, RestockService,
    StockItemService, StockMovementService, StockQueries,
};
use wms_service_core::domains::events::StockLevelBelowMinimumEvent;
use wms_service_core::{AppError, Result};

const JWT_SECRET: &str = "test-secret";

mock! {
    pub LocationSvc {}
    #[async_trait::async_trait]
    impl LocationService for LocationSvc {
        async fn create_location(
            &self,
            ctx: &TenantContext,
            request: CreateLocationRequest,
        ) -> Result<LocationResponse>;
        async fn update_status(
            &self,
            ctx: &TenantContext,
            location_id: Uuid,
            request: UpdateLocationStatusRequest,
        ) -> Result<LocationResponse>;
        async fn block(
            &self,
            ctx: &TenantContext,
            location_id: Uuid,
            request: BlockLocationRequest,
        ) -> Result<LocationResponse>;
        async fn unblock(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse>;
        async fn reserve(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse>;
        async fn release(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse>;
        async fn assign_locations_fefo(
            &self,
            ctx: &TenantContext,
            request: AssignLocationsFefoRequest,
        ) -> Result<FefoAssignmentResponse>;
    }
}

mock! {
    pub LocationQrs {}
    #[async_trait::async_trait]
    impl LocationQueries for LocationQrs {
        async fn get_location(
            &self,
            ctx: &TenantContext,
            location_id: Uuid,
        ) -> Result<LocationDetailResponse>;
        async fn list_locations(
            &self,
            ctx: &TenantContext,
            filter: LocationFilter,
            page: PageParams,
        ) -> Result<Page<LocationResponse>>;
        async fn available_locations(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>>;
        async fn location_hierarchy(
            &self,
            ctx: &TenantContext,
            level: Option<LocationType>,
        ) -> Result<Vec<LocationTreeNode>>;
    }
}

mock! {
    pub StockItemSvc {}
    #[async_trait::async_trait]
    impl StockItemService for StockItemSvc {
        async fn update_expiration_date(
            &self,
            ctx: &TenantContext,
            stock_item_id: Uuid,
            request: UpdateExpirationDateRequest,
        ) -> Result<StockItemResponse>;
        async fn adjust_quantity(
            &self,
            ctx: &TenantContext,
            stock_item_id: Uuid,
            request: AdjustStockQuantityRequest,
        ) -> Result<StockItemResponse>;
        async fn update_allocation(
            &self,
            ctx: &TenantContext,
            stock_item_id: Uuid,
            request: UpdateAllocationRequest,
        ) -> Result<StockItemResponse>;
    }
}

mock! {
    pub StockQrs {}
    #[async_trait::async_trait]
    impl StockQueries for StockQrs {
        async fn get_stock_item(
            &self,
            ctx: &TenantContext,
            stock_item_id: Uuid,
        ) -> Result<StockItemDetailResponse>;
        async fn list_stock_items(
            &self,
            ctx: &TenantContext,
            filter: StockItemFilter,
        ) -> Result<Vec<StockItemResponse>>;
        async fn stock_by_classification(
            &self,
            ctx: &TenantContext,
            classification: StockClassification,
        ) -> Result<Vec<StockItemResponse>>;
        async fn fefo_stock_items(
            &self,
            ctx: &TenantContext,
            product_id: Uuid,
            location_id: Option<Uuid>,
        ) -> Result<Vec<StockItemResponse>>;
        async fn expiring_stock(
            &self,
            ctx: &TenantContext,
            query: ExpiringStockQuery,
        ) -> Result<Vec<StockItemResponse>>;
        async fn check_stock_expiration(
            &self,
            ctx: &TenantContext,
            product_id: Uuid,
            location_id: Uuid,
        ) -> Result<StockExpirationCheckResponse>;
        async fn stock_levels(
            &self,
            ctx: &TenantContext,
            product_id: Uuid,
            location_id: Option<Uuid>,
        ) -> Result<StockLevelResponse>;
    }
}

mock! {
    pub MovementSvc {}
    #[async_trait::async_trait]
    impl StockMovementService for MovementSvc {
        async fn create_movement(
            &self,
            ctx: &TenantContext,
            request: CreateStockMovementRequest,
        ) -> Result<StockMovementResponse>;
        async fn complete_movement(
            &self,
            ctx: &TenantContext,
            movement_id: Uuid,
        ) -> Result<StockMovementResponse>;
        async fn cancel_movement(
            &self,
            ctx: &TenantContext,
            movement_id: Uuid,
            request: CancelStockMovementRequest,
        ) -> Result<StockMovementResponse>;
    }
}

mock! {
    pub RestockSvc {}
    #[async_trait::async_trait]
    impl RestockService for RestockSvc {
        async fn handle_stock_level_below_minimum(
            &self,
            event: StockLevelBelowMinimumEvent,
        ) -> Result<Option<RestockRequestResponse>>;
        async fn mark_sent(
            &self,
            ctx: &TenantContext,
            restock_request_id: Uuid,
            request: MarkRestockSentRequest,
        ) -> Result<RestockRequestResponse>;
        async fn mark_fulfilled(
            &self,
            ctx: &TenantContext,
            restock_request_id: Uuid,
        ) -> Result<RestockRequestResponse>;
        async fn cancel(
            &self,
            ctx: &TenantContext,
            restock_request_id: Uuid,
        ) -> Result<RestockRequestResponse>;
        async fn list(
            &self,
            ctx: &TenantContext,
            filter: RestockFilter,
            page: PageParams,
        ) -> Result<Page<RestockRequestResponse>>;
        async fn upsert_threshold(
            &self,
            ctx: &TenantContext,
            request: UpsertThresholdRequest,
        ) -> Result<ThresholdResponse>;
        async fn list_thresholds(
            &self,
            ctx: &TenantContext,
            product_id: Option<Uuid>,
        ) -> Result<Vec<ThresholdResponse>>;
    }
}

mock! {
    pub ConsignmentSvc {}
    #[async_trait::async_trait]
    impl ConsignmentService for ConsignmentSvc {
        async fn receive_consignment(
            &self,
            ctx: &TenantContext,
            request: ReceiveConsignmentRequest,
        ) -> Result<ConsignmentDetailResponse>;
    }
}

mock! {
    pub ConsignmentQrs {}
    #[async_trait::async_trait]
    impl ConsignmentQueries for ConsignmentQrs {
        async fn list_consignments(
            &self,
            ctx: &TenantContext,
            filter: ConsignmentFilter,
            page: PageParams,
        ) -> Result<Page<ConsignmentResponse>>;
    }
}

struct Mocks {
    location_service: MockLocationSvc,
    location_queries: MockLocationQrs,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            location_service: MockLocationSvc::new(),
            location_queries: MockLocationQrs::new(),
        }
    }
}

fn app(mocks: Mocks) -> axum::Router {
    let state = AppState {
        location_service: Arc::new(mocks.location_service),
        location_queries: Arc::new(mocks.location_queries),
        stock_item_service: Arc::new(MockStockItemSvc::new()),
        stock_queries: Arc::new(MockStockQrs::new()),
        movement_service: Arc::new(MockMovementSvc::new()),
        restock_service: Arc::new(MockRestockSvc::new()),
        consignment_service: Arc::new(MockConsignmentSvc::new()),
        consignment_queries: Arc::new(MockConsignmentQrs::new()),
        jwt_secret: JWT_SECRET.to_string(),
    };
    wms_service_api::build_router(state)
}

fn bearer(tenant_id: Uuid) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        tenant_id,
        vec!["warehouse_operator".to_string()],
        3600,
    );
    format!("Bearer {}", shared_jwt::encode_jwt(&claims, JWT_SECRET).unwrap())
}

fn location_response(tenant_id: Uuid) -> LocationResponse {
    LocationResponse {
        location_id: Uuid::new_v4(),
        tenant_id,
        parent_location_id: None,
        code: Some("WH1".to_string()),
        name: None,
        barcode: "WH00000001".to_string(),
        location_type: LocationType::Warehouse,
        coordinates: None,
        status: wms_service_core::LocationStatus::Available,
        capacity_current: 0,
        capacity_maximum: None,
        description: None,
        created_at: Utc::now(),
        last_modified_at: Utc::now(),
        version: 1,
    }
}

fn create_body(tenant_id: Uuid) -> String {
    serde_json::json!({
        "tenantId": tenant_id,
        "code": "WH1",
        "locationType": "warehouse"
    })
    .to_string()
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = app(Mocks::default());
    let response = app
        .oneshot(
            Request::post("/api/v1/wms/locations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body(Uuid::new_v4())))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_tenant_commands_are_rejected_before_any_write() {
    let mut mocks = Mocks::default();
    // The service must never be reached
    mocks.location_service.expect_create_location().times(0);
    let app = app(mocks);

    let context_tenant = Uuid::new_v4();
    let command_tenant = Uuid::new_v4();
    let response = app
        .oneshot(
            Request::post("/api/v1/wms/locations")
                .header(header::AUTHORIZATION, bearer(context_tenant))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body(command_tenant)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_location_returns_created() {
    let tenant_id = Uuid::new_v4();
    let mut mocks = Mocks::default();
    let created = location_response(tenant_id);
    let created_clone = created.clone();
    mocks
        .location_service
        .expect_create_location()
        .times(1)
        .withf(move |ctx, request| ctx.tenant_id == tenant_id && request.tenant_id == tenant_id)
        .returning(move |_, _| Ok(created_clone.clone()));
    let app = app(mocks);

    let response = app
        .oneshot(
            Request::post("/api/v1/wms/locations")
                .header(header::AUTHORIZATION, bearer(tenant_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(create_body(tenant_id)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["barcode"], "WH00000001");
}

#[tokio::test]
async fn unknown_location_maps_to_not_found() {
    let tenant_id = Uuid::new_v4();
    let mut mocks = Mocks::default();
    mocks
        .location_queries
        .expect_get_location()
        .returning(|_, id| Err(AppError::NotFound(format!("Location {} not found", id))));
    let app = app(mocks);

    let response = app
        .oneshot(
            Request::get(format!("/api/v1/wms/locations/{}", Uuid::new_v4()))
                .header(header::AUTHORIZATION, bearer(tenant_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_conflicts_map_to_conflict() {
    let tenant_id = Uuid::new_v4();
    let mut mocks = Mocks::default();
    mocks
        .location_service
        .expect_update_status()
        .returning(|_, _, _| {
            Err(AppError::ConcurrentModification("stale version".to_string()))
        });
    let app = app(mocks);

    let body = serde_json::json!({
        "tenantId": tenant_id,
        "status": "reserved"
    })
    .to_string();
    let response = app
        .oneshot(
            Request::put(format!("/api/v1/wms/locations/{}/status", Uuid::new_v4()))
                .header(header::AUTHORIZATION, bearer(tenant_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
