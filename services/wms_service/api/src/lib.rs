//! WMS Service API
//!
//! Axum HTTP surface over the WMS core: thin handlers that extract the
//! security context, check the command tenant against it, and delegate to
//! the service traits.

pub mod consumers;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod worker;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use shared_config::Config;
use shared_events::NatsClient;
use wms_service_infra::{
    HttpProductCatalog, LocationCache, CachedLocationReadPort, ConsignmentQueriesImpl,
    ConsignmentServiceImpl, LocationQueriesImpl, LocationServiceImpl, PgConsignmentReadPort,
    PgConsignmentRepository, PgLocationReadPort, PgLocationRepository, PgRestockReadPort,
    PgRestockRequestRepository, PgStockItemRepository, PgStockMovementRepository,
    PgStockReadPort, PgThresholdRepository, RestockServiceImpl, StockItemServiceImpl,
    StockMovementServiceImpl, StockQueriesImpl, TenantDb,
};

use crate::state::AppState;

use wms_service_core::repositories::{LocationReadPort, ProductCatalogPort};

/// Wire repositories, services, and routes into the application router
pub async fn create_router(pool: PgPool, config: &Config, nats: Option<Arc<NatsClient>>) -> Router {
    let db = TenantDb::new(pool.clone(), nats);

    // Write-side repositories
    let location_repo = Arc::new(PgLocationRepository);
    let stock_item_repo = Arc::new(PgStockItemRepository);
    let movement_repo = Arc::new(PgStockMovementRepository);
    let restock_repo = Arc::new(PgRestockRequestRepository);
    let threshold_repo = Arc::new(PgThresholdRepository);
    let consignment_repo = Arc::new(PgConsignmentRepository);

    // Read ports; single-id location reads go through the Redis cache when
    // one is configured
    let location_cache = match &config.redis_url {
        Some(redis_url) => match LocationCache::new(redis_url).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                tracing::warn!("Location cache disabled: {}", e);
                None
            },
        },
        None => None,
    };
    let plain_location_reads: Arc<dyn LocationReadPort> =
        Arc::new(PgLocationReadPort::new(pool.clone()));
    let location_reads: Arc<dyn LocationReadPort> = match &location_cache {
        Some(cache) => Arc::new(CachedLocationReadPort::new(
            Arc::clone(&plain_location_reads),
            Arc::clone(cache),
        )),
        None => plain_location_reads,
    };
    let stock_reads = Arc::new(PgStockReadPort::new(pool.clone()));
    let restock_reads = Arc::new(PgRestockReadPort::new(pool.clone()));
    let consignment_reads = Arc::new(PgConsignmentReadPort::new(pool.clone()));

    // External collaborators
    let catalog: Option<Arc<dyn ProductCatalogPort>> = match &config.product_catalog_url {
        Some(url) => match HttpProductCatalog::new(url, config.external_timeout_ms) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("Product catalog disabled: {}", e);
                None
            },
        },
        None => None,
    };

    let state = AppState {
        location_service: Arc::new(LocationServiceImpl::new(
            db.clone(),
            location_repo.clone(),
            stock_item_repo.clone(),
            location_cache,
        )),
        location_queries: Arc::new(LocationQueriesImpl::new(Arc::clone(&location_reads))),
        stock_item_service: Arc::new(StockItemServiceImpl::new(
            db.clone(),
            stock_item_repo.clone(),
            threshold_repo.clone(),
        )),
        stock_queries: Arc::new(StockQueriesImpl::new(
            db.clone(),
            stock_reads,
            location_reads,
            restock_reads.clone(),
            catalog,
        )),
        movement_service: Arc::new(StockMovementServiceImpl::new(
            db.clone(),
            movement_repo,
            location_repo,
            stock_item_repo.clone(),
            threshold_repo.clone(),
        )),
        restock_service: Arc::new(RestockServiceImpl::new(
            db.clone(),
            restock_repo,
            threshold_repo.clone(),
            restock_reads,
        )),
        consignment_service: Arc::new(ConsignmentServiceImpl::new(
            db,
            consignment_repo,
            stock_item_repo,
            threshold_repo,
        )),
        consignment_queries: Arc::new(ConsignmentQueriesImpl::new(consignment_reads)),
        jwt_secret: config.jwt_secret.clone(),
    };

    build_router(state)
}

/// Assemble the router from a prepared state (tests inject mocks here)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::health::create_health_routes())
        .merge(handlers::locations::create_location_routes())
        .merge(handlers::stock_items::create_stock_item_routes())
        .merge(handlers::stock_movements::create_stock_movement_routes())
        .merge(handlers::restock::create_restock_routes())
        .merge(handlers::consignments::create_consignment_routes())
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
