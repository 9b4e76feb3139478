//! Service traits for location commands and queries

use async_trait::async_trait;
use uuid::Uuid;

use shared_types::{Page, PageParams, TenantContext};

use crate::domains::location::LocationType;
use crate::dto::{
    AssignLocationsFefoRequest, BlockLocationRequest, CreateLocationRequest,
    FefoAssignmentResponse, LocationDetailResponse, LocationFilter, LocationResponse,
    LocationTreeNode, UpdateLocationStatusRequest,
};
use crate::Result;

/// Command operations on the location aggregate
#[async_trait]
pub trait LocationService: Send + Sync {
    /// Create a location in AVAILABLE state. Barcode and code uniqueness is
    /// pre-checked here and enforced by the storage constraints.
    async fn create_location(
        &self,
        ctx: &TenantContext,
        request: CreateLocationRequest,
    ) -> Result<LocationResponse>;

    /// Drive the status machine through the generic update command
    async fn update_status(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
        request: UpdateLocationStatusRequest,
    ) -> Result<LocationResponse>;

    async fn block(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
        request: BlockLocationRequest,
    ) -> Result<LocationResponse>;

    async fn unblock(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse>;

    async fn reserve(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse>;

    async fn release(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse>;

    /// Match unassigned stock items to BIN locations, earliest expiry
    /// first, and apply the resulting plan to both sides of the assignment
    /// in one transaction
    async fn assign_locations_fefo(
        &self,
        ctx: &TenantContext,
        request: AssignLocationsFefoRequest,
    ) -> Result<FefoAssignmentResponse>;
}

/// Read-model operations for locations
#[async_trait]
pub trait LocationQueries: Send + Sync {
    /// Single location with its hierarchy path
    async fn get_location(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
    ) -> Result<LocationDetailResponse>;

    async fn list_locations(
        &self,
        ctx: &TenantContext,
        filter: LocationFilter,
        page: PageParams,
    ) -> Result<Page<LocationResponse>>;

    async fn available_locations(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>>;

    /// Reconstruct the hierarchy, optionally starting at a given level
    async fn location_hierarchy(
        &self,
        ctx: &TenantContext,
        level: Option<LocationType>,
    ) -> Result<Vec<LocationTreeNode>>;
}
