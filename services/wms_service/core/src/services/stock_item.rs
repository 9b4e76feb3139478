//! Service traits for stock item commands and queries

use async_trait::async_trait;
use uuid::Uuid;

use shared_types::TenantContext;

use crate::domains::stock_item::StockClassification;
use crate::dto::{
    AdjustStockQuantityRequest, ExpiringStockQuery, StockExpirationCheckResponse,
    StockItemDetailResponse, StockItemFilter, StockItemResponse, StockLevelResponse,
    UpdateAllocationRequest, UpdateExpirationDateRequest,
};
use crate::Result;

/// Command operations on the stock item aggregate
#[async_trait]
pub trait StockItemService: Send + Sync {
    /// Update the expiration date, reclassify, and publish any transition
    /// events
    async fn update_expiration_date(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
        request: UpdateExpirationDateRequest,
    ) -> Result<StockItemResponse>;

    /// Set the absolute quantity, writing an adjustment ledger row in the
    /// same transaction and re-evaluating the stock level thresholds
    async fn adjust_quantity(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
        request: AdjustStockQuantityRequest,
    ) -> Result<StockItemResponse>;

    /// Set the allocated quantity, writing an allocation ledger row in the
    /// same transaction
    async fn update_allocation(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
        request: UpdateAllocationRequest,
    ) -> Result<StockItemResponse>;
}

/// Read-model operations for stock
#[async_trait]
pub trait StockQueries: Send + Sync {
    /// Single item enriched with product and location metadata; enrichment
    /// failures degrade to nulls
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

    /// Pickable stock of a product in FEFO order
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

    /// Current level of a product against its configured thresholds
    async fn stock_levels(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<StockLevelResponse>;
}
