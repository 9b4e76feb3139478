//! Threshold evaluation shared by the commands that change stock levels
//!
//! Runs inside the caller's tenant transaction; the resulting events join
//! the transaction's buffer and publish only if it commits.

use sqlx::PgConnection;
use uuid::Uuid;

use wms_service_core::domains::events::{
    DomainEvent, StockLevelAboveMaximumEvent, StockLevelBelowMinimumEvent,
};
use wms_service_core::repositories::ThresholdRepository;
use wms_service_core::Result;

/// Compare the current level of a product (optionally scoped to a location)
/// against its threshold and return the breach event, if any.
pub(crate) async fn evaluate_stock_level(
    conn: &mut PgConnection,
    thresholds: &dyn ThresholdRepository,
    tenant_id: Uuid,
    product_id: Uuid,
    location_id: Option<Uuid>,
) -> Result<Option<DomainEvent>> {
    let Some(threshold) = thresholds
        .find_best_match(&mut *conn, tenant_id, product_id, location_id)
        .await?
    else {
        return Ok(None);
    };

    let total = current_quantity(&mut *conn, tenant_id, product_id, location_id).await?;

    if total < threshold.minimum {
        return Ok(Some(DomainEvent::StockLevelBelowMinimum(StockLevelBelowMinimumEvent {
            tenant_id,
            product_id,
            location_id: threshold.location_id,
            current_quantity: total,
            minimum_quantity: threshold.minimum,
            maximum_quantity: threshold.maximum,
        })));
    }
    if let Some(maximum) = threshold.maximum {
        if total > maximum {
            return Ok(Some(DomainEvent::StockLevelAboveMaximum(StockLevelAboveMaximumEvent {
                tenant_id,
                product_id,
                location_id: threshold.location_id,
                current_quantity: total,
                maximum_quantity: maximum,
            })));
        }
    }
    Ok(None)
}

async fn current_quantity(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    product_id: Uuid,
    location_id: Option<Uuid>,
) -> Result<i64> {
    let total: i64 = match location_id {
        Some(location_id) => {
            sqlx::query_scalar(
                "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM stock_items \
                 WHERE tenant_id = $1 AND product_id = $2 AND location_id = $3",
            )
            .bind(tenant_id)
            .bind(product_id)
            .bind(location_id)
            .fetch_one(conn)
            .await?
        },
        None => {
            sqlx::query_scalar(
                "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM stock_items \
                 WHERE tenant_id = $1 AND product_id = $2",
            )
            .bind(tenant_id)
            .bind(product_id)
            .fetch_one(conn)
            .await?
        },
    };
    Ok(total)
}
