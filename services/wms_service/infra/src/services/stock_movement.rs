//! Stock movement workflow service
//!
//! Completion applies the capacity effects on source and destination and
//! relocates the stock item atomically with the status change; a failed
//! precondition rolls the whole transaction back and leaves the movement
//! INITIATED.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use shared_error::AppError;
use shared_types::TenantContext;
use wms_service_core::domains::stock_movement::StockMovement;
use wms_service_core::dto::{
    CancelStockMovementRequest, CreateStockMovementRequest, StockMovementResponse,
};
use wms_service_core::repositories::{
    LocationRepository, StockItemRepository, StockMovementRepository, ThresholdRepository,
};
use wms_service_core::services::StockMovementService;
use wms_service_core::{Result, StockItem};

use crate::services::stock_level::evaluate_stock_level;
use crate::tenant::{TenantDb, TenantTransaction};

/// PostgreSQL implementation of StockMovementService
pub struct StockMovementServiceImpl {
    db: TenantDb,
    movements: Arc<dyn StockMovementRepository>,
    locations: Arc<dyn LocationRepository>,
    stock_items: Arc<dyn StockItemRepository>,
    thresholds: Arc<dyn ThresholdRepository>,
}

impl StockMovementServiceImpl {
    pub fn new(
        db: TenantDb,
        movements: Arc<dyn StockMovementRepository>,
        locations: Arc<dyn LocationRepository>,
        stock_items: Arc<dyn StockItemRepository>,
        thresholds: Arc<dyn ThresholdRepository>,
    ) -> Self {
        Self {
            db,
            movements,
            locations,
            stock_items,
            thresholds,
        }
    }

    /// Resolve the stock item for a movement. An explicit id must exist;
    /// otherwise the first item of the product at the source location with
    /// enough available quantity wins, falling back to the product across
    /// the tenant.
    async fn resolve_stock_item(
        &self,
        tx: &mut TenantTransaction,
        tenant_id: Uuid,
        request: &CreateStockMovementRequest,
    ) -> Result<StockItem> {
        if let Some(stock_item_id) = request.stock_item_id {
            let item = self
                .stock_items
                .find_by_id(tx.conn(), tenant_id, stock_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Stock item {} not found", stock_item_id))
                })?;
            if item.available_quantity() < request.quantity {
                return Err(AppError::InvariantViolation(format!(
                    "Stock item {} has {} available, movement needs {}",
                    stock_item_id,
                    item.available_quantity(),
                    request.quantity
                )));
            }
            return Ok(item);
        }

        let at_source = self
            .stock_items
            .find_by_product_and_location(
                tx.conn(),
                tenant_id,
                request.product_id,
                request.source_location_id,
            )
            .await?;
        if let Some(item) = at_source
            .into_iter()
            .find(|i| i.available_quantity() >= request.quantity)
        {
            return Ok(item);
        }

        let anywhere = self
            .stock_items
            .find_by_product(tx.conn(), tenant_id, request.product_id)
            .await?;
        anywhere
            .into_iter()
            .find(|i| i.available_quantity() >= request.quantity)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No stock of product {} with {} units available",
                    request.product_id, request.quantity
                ))
            })
    }
}

#[async_trait]
impl StockMovementService for StockMovementServiceImpl {
    async fn create_movement(
        &self,
        ctx: &TenantContext,
        request: CreateStockMovementRequest,
    ) -> Result<StockMovementResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;

        let _source = self
            .locations
            .find_by_id(tx.conn(), ctx.tenant_id, request.source_location_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Source location {} not found",
                    request.source_location_id
                ))
            })?;
        let destination = self
            .locations
            .find_by_id(tx.conn(), ctx.tenant_id, request.destination_location_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Destination location {} not found",
                    request.destination_location_id
                ))
            })?;

        if !destination.can_accommodate(request.quantity) {
            return Err(AppError::InvariantViolation(format!(
                "Destination {} cannot accommodate {} units",
                destination.barcode, request.quantity
            )));
        }

        let item = self.resolve_stock_item(&mut tx, ctx.tenant_id, &request).await?;

        let mut movement = StockMovement::initiate(
            ctx.tenant_id,
            item.stock_item_id,
            request.product_id,
            request.source_location_id,
            request.destination_location_id,
            request.quantity,
            request.movement_type,
            request.reason,
            ctx.user_id,
        )?;

        self.movements.insert(tx.conn(), &movement).await?;
        tx.collect(movement.take_events())?;
        tx.commit().await?;

        Ok(StockMovementResponse::from(&movement))
    }

    async fn complete_movement(
        &self,
        ctx: &TenantContext,
        movement_id: Uuid,
    ) -> Result<StockMovementResponse> {
        let mut tx = self.db.begin(ctx).await?;

        let mut movement = self
            .movements
            .find_by_id(tx.conn(), ctx.tenant_id, movement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movement {} not found", movement_id)))?;

        let mut source = self
            .locations
            .find_by_id(tx.conn(), ctx.tenant_id, movement.source_location_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Source location {} not found",
                    movement.source_location_id
                ))
            })?;
        let mut destination = self
            .locations
            .find_by_id(tx.conn(), ctx.tenant_id, movement.destination_location_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Destination location {} not found",
                    movement.destination_location_id
                ))
            })?;
        let mut item = self
            .stock_items
            .find_by_id(tx.conn(), ctx.tenant_id, movement.stock_item_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Stock item {} not found", movement.stock_item_id))
            })?;

        // Re-checked at completion time; rejecting here leaves the movement
        // INITIATED and the capacities untouched
        if !destination.can_accommodate(movement.quantity) {
            return Err(AppError::InvariantViolation(format!(
                "Destination {} cannot accommodate {} units",
                destination.barcode, movement.quantity
            )));
        }

        movement.complete()?;
        source.release_stock(movement.stock_item_id, movement.quantity)?;
        destination.assign_stock(movement.stock_item_id, movement.quantity)?;
        item.relocate(movement.destination_location_id);

        self.movements.update(tx.conn(), &mut movement).await?;
        self.locations.update(tx.conn(), &mut source).await?;
        self.locations.update(tx.conn(), &mut destination).await?;
        self.stock_items.update(tx.conn(), &mut item).await?;

        tx.collect(movement.take_events())?;
        tx.collect(source.take_events())?;
        tx.collect(destination.take_events())?;
        tx.collect(item.take_events())?;

        // Location-scoped levels changed on both ends
        for location_id in [movement.source_location_id, movement.destination_location_id] {
            if let Some(event) = evaluate_stock_level(
                tx.conn(),
                self.thresholds.as_ref(),
                ctx.tenant_id,
                movement.product_id,
                Some(location_id),
            )
            .await?
            {
                tx.collect(vec![event])?;
            }
        }

        tx.commit().await?;
        Ok(StockMovementResponse::from(&movement))
    }

    async fn cancel_movement(
        &self,
        ctx: &TenantContext,
        movement_id: Uuid,
        request: CancelStockMovementRequest,
    ) -> Result<StockMovementResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;
        let mut movement = self
            .movements
            .find_by_id(tx.conn(), ctx.tenant_id, movement_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movement {} not found", movement_id)))?;

        movement.cancel(&request.reason)?;

        self.movements.update(tx.conn(), &mut movement).await?;
        tx.collect(movement.take_events())?;
        tx.commit().await?;

        Ok(StockMovementResponse::from(&movement))
    }
}
