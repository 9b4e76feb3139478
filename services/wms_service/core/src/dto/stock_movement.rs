//! Stock movement DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domains::stock_movement::{MovementStatus, MovementType, StockMovement};

/// Initiate a stock movement.
///
/// `stock_item_id` may be omitted; the handler then resolves the item by
/// (product, source location) and falls back to the product across the
/// tenant.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateStockMovementRequest {
    pub tenant_id: Uuid,
    pub stock_item_id: Option<Uuid>,
    pub product_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[serde(default)]
    pub movement_type: MovementType,
    pub reason: Option<String>,
}

/// Cancel an in-flight movement
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancelStockMovementRequest {
    pub tenant_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Plain movement record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockMovementResponse {
    pub movement_id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub product_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub reason: Option<String>,
    pub status: MovementStatus,
    pub initiated_by: Uuid,
    pub initiated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub version: i64,
}

impl From<&StockMovement> for StockMovementResponse {
    fn from(movement: &StockMovement) -> Self {
        Self {
            movement_id: movement.movement_id,
            tenant_id: movement.tenant_id,
            stock_item_id: movement.stock_item_id,
            product_id: movement.product_id,
            source_location_id: movement.source_location_id,
            destination_location_id: movement.destination_location_id,
            quantity: movement.quantity,
            movement_type: movement.movement_type,
            reason: movement.reason.clone(),
            status: movement.status,
            initiated_by: movement.initiated_by,
            initiated_at: movement.initiated_at,
            completed_at: movement.completed_at,
            cancelled_at: movement.cancelled_at,
            cancellation_reason: movement.cancellation_reason.clone(),
            version: movement.version,
        }
    }
}
