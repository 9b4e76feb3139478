//! Repository port for the stock movement aggregate

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domains::stock_movement::StockMovement;
use crate::Result;

#[async_trait]
pub trait StockMovementRepository: Send + Sync {
    async fn insert(&self, conn: &mut PgConnection, movement: &StockMovement) -> Result<()>;

    /// Persist aggregate changes with optimistic locking. The in-memory
    /// version is bumped on success.
    async fn update(&self, conn: &mut PgConnection, movement: &mut StockMovement) -> Result<()>;

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        movement_id: Uuid,
    ) -> Result<Option<StockMovement>>;
}
