//! Repository ports for restock requests and stock level thresholds

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domains::restock::{RestockRequest, StockLevelThreshold};
use crate::Result;

#[async_trait]
pub trait RestockRequestRepository: Send + Sync {
    async fn insert(&self, conn: &mut PgConnection, request: &RestockRequest) -> Result<()>;

    /// Persist aggregate changes with optimistic locking. The in-memory
    /// version is bumped on success.
    async fn update(&self, conn: &mut PgConnection, request: &mut RestockRequest) -> Result<()>;

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        restock_request_id: Uuid,
    ) -> Result<Option<RestockRequest>>;

    /// The active (PENDING or SENT_TO_D365) request for a
    /// (product, location) pair, if any. At most one exists.
    async fn find_active(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<RestockRequest>>;
}

#[async_trait]
pub trait ThresholdRepository: Send + Sync {
    /// Insert or update the threshold for a (product, location) pair
    async fn upsert(
        &self,
        conn: &mut PgConnection,
        threshold: &StockLevelThreshold,
    ) -> Result<StockLevelThreshold>;

    /// Most specific threshold for a product: the location-scoped row when
    /// present, else the product-wide row
    async fn find_best_match(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<StockLevelThreshold>>;
}
