//! Service trait for restock requests and thresholds

use async_trait::async_trait;
use uuid::Uuid;

use shared_types::{Page, PageParams, TenantContext};

use crate::domains::events::StockLevelBelowMinimumEvent;
use crate::dto::{
    MarkRestockSentRequest, RestockFilter, RestockRequestResponse, ThresholdResponse,
    UpsertThresholdRequest,
};
use crate::Result;

#[async_trait]
pub trait RestockService: Send + Sync {
    /// React to a below-minimum event: generate a restock request, or update
    /// the already active one for the same (product, location). Returns
    /// `None` when auto-restock is disabled for the product.
    async fn handle_stock_level_below_minimum(
        &self,
        event: StockLevelBelowMinimumEvent,
    ) -> Result<Option<RestockRequestResponse>>;

    /// PENDING -> SENT_TO_D365 with the external order reference
    async fn mark_sent(
        &self,
        ctx: &TenantContext,
        restock_request_id: Uuid,
        request: MarkRestockSentRequest,
    ) -> Result<RestockRequestResponse>;

    /// SENT_TO_D365 -> FULFILLED (idempotent)
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

    /// Create or replace the threshold for a (product, location) pair
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
