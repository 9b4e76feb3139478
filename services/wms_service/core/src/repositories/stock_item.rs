//! Repository port for the stock item aggregate and its ledgers

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domains::events::{
    StockAdjustedEvent, StockAllocatedEvent, StockAllocationReleasedEvent,
};
use crate::domains::stock_item::StockItem;
use crate::Result;

#[async_trait]
pub trait StockItemRepository: Send + Sync {
    async fn insert(&self, conn: &mut PgConnection, item: &StockItem) -> Result<()>;

    /// Persist aggregate changes with optimistic locking. The in-memory
    /// version is bumped on success.
    async fn update(&self, conn: &mut PgConnection, item: &mut StockItem) -> Result<()>;

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        stock_item_id: Uuid,
    ) -> Result<Option<StockItem>>;

    /// Items of a product at a specific location, earliest expiry first
    async fn find_by_product_and_location(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<StockItem>>;

    /// Items of a product anywhere in the tenant, earliest expiry first
    async fn find_by_product(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockItem>>;

    /// Append an adjustment ledger row (written in the same transaction as
    /// the quantity change)
    async fn append_adjustment(
        &self,
        conn: &mut PgConnection,
        event: &StockAdjustedEvent,
        adjusted_by: Uuid,
    ) -> Result<()>;

    /// Append an allocation ledger row for an allocation increase
    async fn append_allocation(
        &self,
        conn: &mut PgConnection,
        event: &StockAllocatedEvent,
        allocated_by: Uuid,
    ) -> Result<()>;

    /// Append an allocation ledger row for an allocation release
    async fn append_allocation_release(
        &self,
        conn: &mut PgConnection,
        event: &StockAllocationReleasedEvent,
        released_by: Uuid,
    ) -> Result<()>;
}
