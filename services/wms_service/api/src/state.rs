//! Application state for the WMS service
//!
//! Shared across all handlers; every field is a trait object so tests can
//! substitute mocks.

use std::sync::Arc;

use shared_auth::JwtSecretProvider;
use wms_service_core::services::{
    ConsignmentQueries, ConsignmentService, LocationQueries, LocationService, RestockService,
    StockItemService, StockMovementService, StockQueries,
};

/// Application state for the WMS service
#[derive(Clone)]
pub struct AppState {
    pub location_service: Arc<dyn LocationService>,
    pub location_queries: Arc<dyn LocationQueries>,
    pub stock_item_service: Arc<dyn StockItemService>,
    pub stock_queries: Arc<dyn StockQueries>,
    pub movement_service: Arc<dyn StockMovementService>,
    pub restock_service: Arc<dyn RestockService>,
    pub consignment_service: Arc<dyn ConsignmentService>,
    pub consignment_queries: Arc<dyn ConsignmentQueries>,
    pub jwt_secret: String,
}

impl JwtSecretProvider for AppState {
    fn get_jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
