//! PostgreSQL adapter for the stock movement aggregate

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use shared_error::AppError;
use wms_service_core::domains::stock_movement::{MovementStatus, MovementType, StockMovement};
use wms_service_core::repositories::StockMovementRepository;
use wms_service_core::Result;

#[derive(sqlx::FromRow)]
struct StockMovementRow {
    movement_id: Uuid,
    tenant_id: Uuid,
    stock_item_id: Uuid,
    product_id: Uuid,
    source_location_id: Uuid,
    destination_location_id: Uuid,
    quantity: i64,
    movement_type: MovementType,
    reason: Option<String>,
    status: MovementStatus,
    initiated_by: Uuid,
    initiated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
    version: i64,
}

impl StockMovementRow {
    fn into_aggregate(self) -> StockMovement {
        StockMovement::from_storage(
            self.movement_id,
            self.tenant_id,
            self.stock_item_id,
            self.product_id,
            self.source_location_id,
            self.destination_location_id,
            self.quantity,
            self.movement_type,
            self.reason,
            self.status,
            self.initiated_by,
            self.initiated_at,
            self.completed_at,
            self.cancelled_at,
            self.cancellation_reason,
            self.version,
        )
    }
}

/// PostgreSQL implementation of StockMovementRepository
pub struct PgStockMovementRepository;

#[async_trait]
impl StockMovementRepository for PgStockMovementRepository {
    async fn insert(&self, conn: &mut PgConnection, movement: &StockMovement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                movement_id, tenant_id, stock_item_id, product_id,
                source_location_id, destination_location_id, quantity,
                movement_type, reason, status, initiated_by, initiated_at,
                completed_at, cancelled_at, cancellation_reason, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(movement.movement_id)
        .bind(movement.tenant_id)
        .bind(movement.stock_item_id)
        .bind(movement.product_id)
        .bind(movement.source_location_id)
        .bind(movement.destination_location_id)
        .bind(movement.quantity)
        .bind(movement.movement_type)
        .bind(&movement.reason)
        .bind(movement.status)
        .bind(movement.initiated_by)
        .bind(movement.initiated_at)
        .bind(movement.completed_at)
        .bind(movement.cancelled_at)
        .bind(&movement.cancellation_reason)
        .bind(movement.version)
        .execute(conn)
        .await?;

        Ok(())
    }

    async fn update(&self, conn: &mut PgConnection, movement: &mut StockMovement) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_movements
            SET status = $3, completed_at = $4, cancelled_at = $5,
                cancellation_reason = $6, version = version + 1
            WHERE tenant_id = $1 AND movement_id = $2 AND version = $7
            "#,
        )
        .bind(movement.tenant_id)
        .bind(movement.movement_id)
        .bind(movement.status)
        .bind(movement.completed_at)
        .bind(movement.cancelled_at)
        .bind(&movement.cancellation_reason)
        .bind(movement.version)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConcurrentModification(format!(
                "Stock movement {} was modified concurrently",
                movement.movement_id
            )));
        }
        movement.version += 1;
        Ok(())
    }

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        movement_id: Uuid,
    ) -> Result<Option<StockMovement>> {
        let row = sqlx::query_as::<_, StockMovementRow>(
            r#"
            SELECT movement_id, tenant_id, stock_item_id, product_id,
                   source_location_id, destination_location_id, quantity,
                   movement_type, reason, status, initiated_by, initiated_at,
                   completed_at, cancelled_at, cancellation_reason, version
            FROM stock_movements
            WHERE tenant_id = $1 AND movement_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(movement_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(StockMovementRow::into_aggregate))
    }
}
