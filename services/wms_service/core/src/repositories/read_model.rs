//! Read-model ports
//!
//! Thinner than the write repositories: they take the tenant context, reuse
//! the same tables, and return plain result records only.

use async_trait::async_trait;
use uuid::Uuid;

use shared_types::{Page, PageParams, TenantContext};

use crate::domains::stock_item::StockClassification;
use crate::dto::{
    ConsignmentFilter, ConsignmentResponse, LocationFilter, LocationResponse, RestockFilter,
    RestockRequestResponse, StockItemFilter, StockItemResponse, ThresholdResponse,
};
use crate::Result;

#[async_trait]
pub trait LocationReadPort: Send + Sync {
    async fn get(&self, ctx: &TenantContext, location_id: Uuid)
        -> Result<Option<LocationResponse>>;

    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &LocationFilter,
        page: PageParams,
    ) -> Result<Page<LocationResponse>>;

    async fn list_available(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>>;

    /// Every location of the tenant; used for path and hierarchy
    /// reconstruction
    async fn list_all(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>>;
}

/// Quantity totals for a (product, location?) pair
#[derive(Debug, Clone, Copy, Default)]
pub struct StockLevelTotals {
    pub total_quantity: i64,
    pub allocated_quantity: i64,
}

#[async_trait]
pub trait StockReadPort: Send + Sync {
    async fn get(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
    ) -> Result<Option<StockItemResponse>>;

    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &StockItemFilter,
    ) -> Result<Vec<StockItemResponse>>;

    async fn list_by_classification(
        &self,
        ctx: &TenantContext,
        classification: StockClassification,
    ) -> Result<Vec<StockItemResponse>>;

    /// Pickable items of a product in FEFO order (earliest expiry first,
    /// nulls last)
    async fn list_fefo(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Vec<StockItemResponse>>;

    /// Items expiring within the window (already expired included)
    async fn list_expiring(
        &self,
        ctx: &TenantContext,
        days_ahead: i64,
        classification: Option<StockClassification>,
    ) -> Result<Vec<StockItemResponse>>;

    /// Items of a product at a location, for expiration checks
    async fn list_at_location(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<StockItemResponse>>;

    async fn level_totals(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<StockLevelTotals>;
}

#[async_trait]
pub trait RestockReadPort: Send + Sync {
    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &RestockFilter,
        page: PageParams,
    ) -> Result<Page<RestockRequestResponse>>;

    async fn list_thresholds(
        &self,
        ctx: &TenantContext,
        product_id: Option<Uuid>,
    ) -> Result<Vec<ThresholdResponse>>;
}

#[async_trait]
pub trait ConsignmentReadPort: Send + Sync {
    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &ConsignmentFilter,
        page: PageParams,
    ) -> Result<Page<ConsignmentResponse>>;
}
