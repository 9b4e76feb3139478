//! Restock request and threshold DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domains::restock::{
    RestockPriority, RestockRequest, RestockStatus, StockLevelThreshold,
};

/// Record the D365 order reference after the request was transmitted
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarkRestockSentRequest {
    pub tenant_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub order_reference: String,
}

/// Plain restock request record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RestockRequestResponse {
    pub restock_request_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub current_quantity: i64,
    pub minimum_quantity: i64,
    pub maximum_quantity: Option<i64>,
    pub requested_quantity: i64,
    pub priority: RestockPriority,
    pub status: RestockStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub order_reference: Option<String>,
    pub version: i64,
}

impl From<&RestockRequest> for RestockRequestResponse {
    fn from(request: &RestockRequest) -> Self {
        Self {
            restock_request_id: request.restock_request_id,
            tenant_id: request.tenant_id,
            product_id: request.product_id,
            location_id: request.location_id,
            current_quantity: request.current_quantity,
            minimum_quantity: request.minimum_quantity,
            maximum_quantity: request.maximum_quantity,
            requested_quantity: request.requested_quantity,
            priority: request.priority,
            status: request.status,
            created_at: request.created_at,
            sent_at: request.sent_at,
            order_reference: request.order_reference.clone(),
            version: request.version,
        }
    }
}

/// List filter for restock requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct RestockFilter {
    pub status: Option<RestockStatus>,
    pub priority: Option<RestockPriority>,
    pub product_id: Option<Uuid>,
}

/// Create or update a stock level threshold
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpsertThresholdRequest {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub minimum: i64,
    #[validate(range(min = 1))]
    pub maximum: Option<i64>,
    #[serde(default)]
    pub enable_auto_restock: bool,
}

/// Plain threshold record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ThresholdResponse {
    pub threshold_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub minimum: i64,
    pub maximum: Option<i64>,
    pub enable_auto_restock: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,
}

impl From<&StockLevelThreshold> for ThresholdResponse {
    fn from(threshold: &StockLevelThreshold) -> Self {
        Self {
            threshold_id: threshold.threshold_id,
            tenant_id: threshold.tenant_id,
            product_id: threshold.product_id,
            location_id: threshold.location_id,
            minimum: threshold.minimum,
            maximum: threshold.maximum,
            enable_auto_restock: threshold.enable_auto_restock,
            created_at: threshold.created_at,
            last_modified_at: threshold.last_modified_at,
            version: threshold.version,
        }
    }
}
