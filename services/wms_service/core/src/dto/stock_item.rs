//! Stock item DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domains::stock_item::{StockClassification, StockItem};
use crate::repositories::product_catalog::ProductMetadata;

use super::location::LocationResponse;

/// Change (or clear) the expiration date of a stock item
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateExpirationDateRequest {
    pub tenant_id: Uuid,
    pub expiration_date: Option<NaiveDate>,
}

/// Set the absolute quantity of a stock item, with an audit reason
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdjustStockQuantityRequest {
    pub tenant_id: Uuid,
    #[validate(range(min = 0))]
    pub new_quantity: i64,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Set the allocated (reserved-for-picking) quantity of a stock item
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAllocationRequest {
    pub tenant_id: Uuid,
    #[validate(range(min = 0))]
    pub allocated_quantity: i64,
}

/// Plain stock item record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockItemResponse {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub consignment_id: Uuid,
    pub location_id: Option<Uuid>,
    pub quantity: i64,
    pub allocated_quantity: i64,
    pub available_quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    pub classification: StockClassification,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,
}

impl From<&StockItem> for StockItemResponse {
    fn from(item: &StockItem) -> Self {
        Self {
            stock_item_id: item.stock_item_id,
            tenant_id: item.tenant_id,
            product_id: item.product_id,
            consignment_id: item.consignment_id,
            location_id: item.location_id,
            quantity: item.quantity,
            allocated_quantity: item.allocated_quantity,
            available_quantity: item.available_quantity(),
            expiration_date: item.expiration_date,
            classification: item.classification,
            created_at: item.created_at,
            last_modified_at: item.last_modified_at,
            version: item.version,
        }
    }
}

/// Single-item query result enriched with collaborator metadata.
///
/// Enrichment is best-effort: a failing or empty metadata lookup leaves the
/// fields null rather than failing the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockItemDetailResponse {
    pub item: StockItemResponse,
    pub product: Option<ProductMetadata>,
    pub location: Option<LocationResponse>,
}

/// List filter for stock items
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct StockItemFilter {
    pub product_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub consignment_id: Option<Uuid>,
    pub classification: Option<StockClassification>,
}

/// Expiring-stock query window
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ExpiringStockQuery {
    /// Items expiring within this many days (expired items included)
    #[validate(range(min = 0, max = 3650))]
    pub days_ahead: i64,
    pub classification: Option<StockClassification>,
}

/// Expiration summary for a (product, location) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockExpirationCheckResponse {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub total_quantity: i64,
    pub expired_quantity: i64,
    pub critical_quantity: i64,
    pub near_expiry_quantity: i64,
    pub earliest_expiration: Option<NaiveDate>,
}

/// Aggregated stock level against the configured thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StockLevelResponse {
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub total_quantity: i64,
    pub allocated_quantity: i64,
    pub available_quantity: i64,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub below_minimum: bool,
    pub above_maximum: bool,
}
