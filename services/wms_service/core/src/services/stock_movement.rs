//! Service trait for the stock movement workflow

use async_trait::async_trait;
use uuid::Uuid;

use shared_types::TenantContext;

use crate::dto::{
    CancelStockMovementRequest, CreateStockMovementRequest, StockMovementResponse,
};
use crate::Result;

#[async_trait]
pub trait StockMovementService: Send + Sync {
    /// Initiate a movement after checking that both locations exist in the
    /// tenant, the destination accommodates the quantity, and the stock item
    /// has enough available quantity. Resolves the stock item by
    /// (product, source location) and then by product when no id was given.
    async fn create_movement(
        &self,
        ctx: &TenantContext,
        request: CreateStockMovementRequest,
    ) -> Result<StockMovementResponse>;

    /// Complete the movement, applying the capacity and location effects on
    /// source, destination, and stock item atomically with the status change
    async fn complete_movement(
        &self,
        ctx: &TenantContext,
        movement_id: Uuid,
    ) -> Result<StockMovementResponse>;

    /// Cancel an INITIATED movement with a reason
    async fn cancel_movement(
        &self,
        ctx: &TenantContext,
        movement_id: Uuid,
        request: CancelStockMovementRequest,
    ) -> Result<StockMovementResponse>;
}
