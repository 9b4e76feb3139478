//! Consignment entity
//!
//! Inbound consignments group the stock items they delivered; stock items
//! reference their consignment by id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consignment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ConsignmentStatus {
    Announced,
    Receiving,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Consignment {
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

impl Consignment {
    pub fn new(
        tenant_id: Uuid,
        consignment_number: String,
        supplier_reference: Option<String>,
        expected_arrival: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        Self {
            consignment_id: Uuid::now_v7(),
            tenant_id,
            consignment_number,
            supplier_reference,
            expected_arrival,
            status: ConsignmentStatus::Announced,
            created_at: now,
            last_modified_at: now,
            version: 1,
        }
    }
}
