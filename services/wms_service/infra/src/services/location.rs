//! Location command and query services

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::location::{
    build_location_path, validate_barcode, Location, LocationType, PathNode,
};
use wms_service_core::dto::{
    AssignLocationsFefoRequest, BlockLocationRequest, CreateLocationRequest,
    FefoAssignmentResponse, LocationDetailResponse, LocationFilter, LocationResponse,
    LocationTreeNode, UpdateLocationStatusRequest,
};
use wms_service_core::repositories::{LocationReadPort, LocationRepository, StockItemRepository};
use wms_service_core::services::{LocationQueries, LocationService};
use wms_service_core::{plan_assignments, BinCandidate, FefoAssignmentRequest, Result, StockItem};

use crate::services::cache::LocationCache;
use crate::tenant::TenantDb;

/// PostgreSQL implementation of LocationService
pub struct LocationServiceImpl {
    db: TenantDb,
    locations: Arc<dyn LocationRepository>,
    stock_items: Arc<dyn StockItemRepository>,
    cache: Option<Arc<LocationCache>>,
}

impl LocationServiceImpl {
    pub fn new(
        db: TenantDb,
        locations: Arc<dyn LocationRepository>,
        stock_items: Arc<dyn StockItemRepository>,
        cache: Option<Arc<LocationCache>>,
    ) -> Self {
        Self {
            db,
            locations,
            stock_items,
            cache,
        }
    }

    async fn invalidate_cache(&self, tenant_id: Uuid, location_id: Uuid) {
        if let Some(cache) = &self.cache {
            cache.invalidate(tenant_id, location_id).await;
        }
    }

    /// Load a location, apply a domain operation, persist, and publish
    async fn mutate<F>(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
        op: F,
    ) -> Result<LocationResponse>
    where
        F: FnOnce(&mut Location) -> Result<()> + Send,
    {
        let mut tx = self.db.begin(ctx).await?;
        let mut location = self
            .locations
            .find_by_id(tx.conn(), ctx.tenant_id, location_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", location_id)))?;

        op(&mut location)?;

        self.locations.update(tx.conn(), &mut location).await?;
        tx.collect(location.take_events())?;
        tx.commit().await?;

        self.invalidate_cache(ctx.tenant_id, location_id).await;
        Ok(LocationResponse::from(&location))
    }
}

#[async_trait]
impl LocationService for LocationServiceImpl {
    async fn create_location(
        &self,
        ctx: &TenantContext,
        request: CreateLocationRequest,
    ) -> Result<LocationResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;

        // Advisory uniqueness pre-checks; the unique indexes stay
        // authoritative under concurrency
        if let Some(barcode) = &request.barcode {
            validate_barcode(barcode)?;
            if self
                .locations
                .find_by_barcode(tx.conn(), ctx.tenant_id, barcode)
                .await?
                .is_some()
            {
                return Err(AppError::Conflict(format!("Barcode {} is already in use", barcode)));
            }
        }
        if let Some(code) = &request.code {
            if self.locations.find_by_code(tx.conn(), ctx.tenant_id, code).await?.is_some() {
                return Err(AppError::Conflict(format!("Code {} is already in use", code)));
            }
        }
        if let Some(parent_id) = request.parent_location_id {
            self.locations
                .find_by_id(tx.conn(), ctx.tenant_id, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::ValidationError("Parent location does not exist".to_string())
                })?;
        }

        let mut location = Location::create(
            ctx.tenant_id,
            request.parent_location_id,
            request.code,
            request.name,
            request.barcode,
            request.location_type,
            request.coordinates,
            request.maximum_capacity,
            request.description,
        )?;

        self.locations.insert(tx.conn(), &location).await?;
        tx.collect(location.take_events())?;
        tx.commit().await?;

        Ok(LocationResponse::from(&location))
    }

    async fn update_status(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
        request: UpdateLocationStatusRequest,
    ) -> Result<LocationResponse> {
        request.validate()?;
        self.mutate(ctx, location_id, |location| {
            location.update_status(request.status, request.reason.as_deref())
        })
        .await
    }

    async fn block(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
        request: BlockLocationRequest,
    ) -> Result<LocationResponse> {
        request.validate()?;
        self.mutate(ctx, location_id, |location| location.block(&request.reason)).await
    }

    async fn unblock(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse> {
        self.mutate(ctx, location_id, |location| location.unblock()).await
    }

    async fn reserve(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse> {
        self.mutate(ctx, location_id, |location| location.reserve()).await
    }

    async fn release(&self, ctx: &TenantContext, location_id: Uuid) -> Result<LocationResponse> {
        self.mutate(ctx, location_id, |location| location.release()).await
    }

    async fn assign_locations_fefo(
        &self,
        ctx: &TenantContext,
        request: AssignLocationsFefoRequest,
    ) -> Result<FefoAssignmentResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;
        let today = Utc::now().date_naive();

        let mut items: HashMap<Uuid, StockItem> = HashMap::new();
        let mut planner_requests = Vec::with_capacity(request.stock_items.len());
        for item_ref in &request.stock_items {
            let item = self
                .stock_items
                .find_by_id(tx.conn(), ctx.tenant_id, item_ref.stock_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Stock item {} not found", item_ref.stock_item_id))
                })?;

            planner_requests.push(FefoAssignmentRequest {
                stock_item_id: item.stock_item_id,
                quantity: item_ref.quantity.unwrap_or(item.quantity),
                expiration_date: item.expiration_date,
                classification: item.classification,
            });
            items.insert(item.stock_item_id, item);
        }

        let bins = self.locations.find_assignable_bins(tx.conn(), ctx.tenant_id).await?;
        let candidates: Vec<BinCandidate> = bins.iter().map(BinCandidate::from).collect();
        let plan = plan_assignments(&planner_requests, &candidates, today);

        let mut bin_map: HashMap<Uuid, Location> =
            bins.into_iter().map(|b| (b.location_id, b)).collect();
        let mut touched_bins: HashSet<Uuid> = HashSet::new();

        for assignment in &plan.assignments {
            let item = items.get_mut(&assignment.stock_item_id).ok_or_else(|| {
                AppError::InternalError("Planner returned an unknown stock item".to_string())
            })?;
            let bin = bin_map.get_mut(&assignment.location_id).ok_or_else(|| {
                AppError::InternalError("Planner returned an unknown location".to_string())
            })?;

            item.assign_location(assignment.location_id, assignment.quantity)?;
            bin.assign_stock(assignment.stock_item_id, assignment.quantity)?;
            touched_bins.insert(assignment.location_id);
        }

        for assignment in &plan.assignments {
            if let Some(item) = items.remove(&assignment.stock_item_id) {
                let mut item = item;
                self.stock_items.update(tx.conn(), &mut item).await?;
                tx.collect(item.take_events())?;
            }
        }
        for location_id in &touched_bins {
            if let Some(bin) = bin_map.remove(location_id) {
                let mut bin = bin;
                self.locations.update(tx.conn(), &mut bin).await?;
                tx.collect(bin.take_events())?;
            }
        }

        tx.commit().await?;

        for location_id in touched_bins {
            self.invalidate_cache(ctx.tenant_id, location_id).await;
        }

        Ok(FefoAssignmentResponse {
            assignments: plan.assignments,
            unassigned: plan.unassigned,
        })
    }
}

/// Read-side implementation over the location read port
pub struct LocationQueriesImpl {
    reads: Arc<dyn LocationReadPort>,
}

impl LocationQueriesImpl {
    pub fn new(reads: Arc<dyn LocationReadPort>) -> Self {
        Self { reads }
    }
}

#[async_trait]
impl LocationQueries for LocationQueriesImpl {
    async fn get_location(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
    ) -> Result<LocationDetailResponse> {
        let location = self
            .reads
            .get(ctx, location_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", location_id)))?;

        let all = self.reads.list_all(ctx).await?;
        let nodes: HashMap<Uuid, PathNode> =
            all.iter().map(|l| (l.location_id, PathNode::from(l))).collect();
        let path = build_location_path(location_id, &nodes);

        Ok(LocationDetailResponse { location, path })
    }

    async fn list_locations(
        &self,
        ctx: &TenantContext,
        filter: LocationFilter,
        page: PageParams,
    ) -> Result<Page<LocationResponse>> {
        self.reads.list(ctx, &filter, page).await
    }

    async fn available_locations(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>> {
        self.reads.list_available(ctx).await
    }

    async fn location_hierarchy(
        &self,
        ctx: &TenantContext,
        level: Option<LocationType>,
    ) -> Result<Vec<LocationTreeNode>> {
        let all = self.reads.list_all(ctx).await?;

        let mut children_of: HashMap<Option<Uuid>, Vec<&LocationResponse>> = HashMap::new();
        for location in &all {
            children_of.entry(location.parent_location_id).or_default().push(location);
        }

        let roots: Vec<&LocationResponse> = match level {
            Some(level) => all.iter().filter(|l| l.location_type == level).collect(),
            None => all
                .iter()
                .filter(|l| {
                    l.parent_location_id.is_none()
                        || l.location_type == LocationType::Warehouse
                })
                .collect(),
        };

        let mut visited = HashSet::new();
        Ok(roots
            .into_iter()
            .map(|root| build_tree(root, &children_of, &mut visited))
            .collect())
    }
}

/// Depth-first tree construction; the visited set makes a cyclic parent
/// chain terminate instead of recursing forever
fn build_tree(
    node: &LocationResponse,
    children_of: &HashMap<Option<Uuid>, Vec<&LocationResponse>>,
    visited: &mut HashSet<Uuid>,
) -> LocationTreeNode {
    let children = if visited.insert(node.location_id) {
        children_of
            .get(&Some(node.location_id))
            .map(|children| {
                children
                    .iter()
                    .map(|child| build_tree(child, children_of, visited))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        tracing::warn!(location_id = %node.location_id, "Cycle detected in location hierarchy");
        Vec::new()
    };

    LocationTreeNode {
        location: node.clone(),
        children,
    }
}
