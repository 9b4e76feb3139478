//! Consignment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domains::consignment::{Consignment, ConsignmentStatus};
use crate::dto::stock_item::StockItemResponse;

/// Receive an inbound consignment together with the stock items it delivered
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReceiveConsignmentRequest {
    pub tenant_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub consignment_number: String,
    pub supplier_reference: Option<String>,
    pub expected_arrival: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub items: Vec<ReceiveConsignmentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReceiveConsignmentItem {
    pub product_id: Uuid,
    #[validate(range(min = 0))]
    pub quantity: i64,
    pub expiration_date: Option<NaiveDate>,
}

/// Intake result: the consignment plus the stock items created from it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConsignmentDetailResponse {
    pub consignment: ConsignmentResponse,
    pub items: Vec<StockItemResponse>,
}

/// Plain consignment record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConsignmentResponse {
    pub consignment_id: Uuid,
    pub tenant_id: Uuid,
    pub consignment_number: String,
    pub supplier_reference: Option<String>,
    pub expected_arrival: Option<NaiveDate>,
    pub status: ConsignmentStatus,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,
}

impl From<&Consignment> for ConsignmentResponse {
    fn from(consignment: &Consignment) -> Self {
        Self {
            consignment_id: consignment.consignment_id,
            tenant_id: consignment.tenant_id,
            consignment_number: consignment.consignment_number.clone(),
            supplier_reference: consignment.supplier_reference.clone(),
            expected_arrival: consignment.expected_arrival,
            status: consignment.status,
            created_at: consignment.created_at,
            last_modified_at: consignment.last_modified_at,
            version: consignment.version,
        }
    }
}

/// List filter for consignments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ConsignmentFilter {
    pub status: Option<ConsignmentStatus>,
}
