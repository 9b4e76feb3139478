//! Location DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domains::location::{
    Capacity, Coordinates, Location, LocationStatus, LocationType, PathNode,
};
use crate::services::fefo::FefoAssignment;

/// Create a new location
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateLocationRequest {
    pub tenant_id: Uuid,
    pub parent_location_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// 8-20 uppercase alphanumerics; generated when omitted
    pub barcode: Option<String>,
    pub location_type: LocationType,
    pub coordinates: Option<Coordinates>,
    #[validate(range(min = 0))]
    pub maximum_capacity: Option<i64>,
    pub description: Option<String>,
}

/// Drive the location status machine
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateLocationStatusRequest {
    pub tenant_id: Uuid,
    pub status: LocationStatus,
    pub reason: Option<String>,
}

/// Block a location, taking it out of service
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BlockLocationRequest {
    pub tenant_id: Uuid,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Plain location record returned by commands and queries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LocationResponse {
    pub location_id: Uuid,
    pub tenant_id: Uuid,
    pub parent_location_id: Option<Uuid>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub barcode: String,
    pub location_type: LocationType,
    pub coordinates: Option<Coordinates>,
    pub status: LocationStatus,
    pub capacity_current: i64,
    pub capacity_maximum: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,
}

impl From<&Location> for LocationResponse {
    fn from(location: &Location) -> Self {
        let Capacity { current, maximum } = location.capacity;
        Self {
            location_id: location.location_id,
            tenant_id: location.tenant_id,
            parent_location_id: location.parent_location_id,
            code: location.code.clone(),
            name: location.name.clone(),
            barcode: location.barcode.clone(),
            location_type: location.location_type,
            coordinates: location.coordinates.clone(),
            status: location.status,
            capacity_current: current,
            capacity_maximum: maximum,
            description: location.description.clone(),
            created_at: location.created_at,
            last_modified_at: location.last_modified_at,
            version: location.version,
        }
    }
}

impl From<&LocationResponse> for PathNode {
    fn from(location: &LocationResponse) -> Self {
        Self {
            location_id: location.location_id,
            parent_location_id: location.parent_location_id,
            segment: location
                .code
                .clone()
                .unwrap_or_else(|| location.barcode.clone()),
            location_type: location.location_type,
        }
    }
}

/// Single-location query result, enriched with the hierarchy path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LocationDetailResponse {
    pub location: LocationResponse,
    /// `/WH1/Z1/B1`; empty when the parent chain is cyclic
    pub path: String,
}

/// Node of the reconstructed location hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LocationTreeNode {
    pub location: LocationResponse,
    #[cfg_attr(feature = "openapi", schema(no_recursion))]
    pub children: Vec<LocationTreeNode>,
}

/// List filter for locations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct LocationFilter {
    pub location_type: Option<LocationType>,
    pub status: Option<LocationStatus>,
    pub parent_location_id: Option<Uuid>,
}

/// FEFO assignment command: stock items asking for BINs
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignLocationsFefoRequest {
    pub tenant_id: Uuid,
    #[validate(length(min = 1))]
    pub stock_items: Vec<FefoStockItemRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FefoStockItemRef {
    pub stock_item_id: Uuid,
    /// Defaults to the item's full quantity when omitted
    #[validate(range(min = 1))]
    pub quantity: Option<i64>,
}

/// FEFO assignment outcome; unassigned items are a normal partial result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FefoAssignmentResponse {
    pub assignments: Vec<FefoAssignment>,
    pub unassigned: Vec<Uuid>,
}
