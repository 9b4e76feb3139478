//! Stock item command and query services

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use shared_error::AppError;
use shared_types::TenantContext;
use wms_service_core::domains::events::{DomainEvent, StockLevelBelowMinimumEvent};
use wms_service_core::domains::stock_item::StockClassification;
use wms_service_core::dto::{
    AdjustStockQuantityRequest, ExpiringStockQuery, StockExpirationCheckResponse,
    StockItemDetailResponse, StockItemFilter, StockItemResponse, StockLevelResponse,
    ThresholdResponse, UpdateAllocationRequest, UpdateExpirationDateRequest,
};
use wms_service_core::repositories::{
    LocationReadPort, ProductCatalogPort, RestockReadPort, StockItemRepository, StockReadPort,
    ThresholdRepository,
};
use wms_service_core::services::{StockItemService, StockQueries};
use wms_service_core::{Result, StockItem};

use crate::services::stock_level::evaluate_stock_level;
use crate::tenant::{TenantDb, TenantTransaction};

/// PostgreSQL implementation of StockItemService
pub struct StockItemServiceImpl {
    db: TenantDb,
    stock_items: Arc<dyn StockItemRepository>,
    thresholds: Arc<dyn ThresholdRepository>,
}

impl StockItemServiceImpl {
    pub fn new(
        db: TenantDb,
        stock_items: Arc<dyn StockItemRepository>,
        thresholds: Arc<dyn ThresholdRepository>,
    ) -> Self {
        Self {
            db,
            stock_items,
            thresholds,
        }
    }

    async fn load_item(
        &self,
        tx: &mut TenantTransaction,
        tenant_id: Uuid,
        stock_item_id: Uuid,
    ) -> Result<StockItem> {
        self.stock_items
            .find_by_id(tx.conn(), tenant_id, stock_item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Stock item {} not found", stock_item_id)))
    }

    /// Write ledger rows for the drained events, then buffer them on the
    /// transaction
    async fn persist_ledgers_and_collect(
        &self,
        tx: &mut TenantTransaction,
        actor: Uuid,
        events: Vec<DomainEvent>,
    ) -> Result<()> {
        for event in &events {
            match event {
                DomainEvent::StockAdjusted(e) => {
                    self.stock_items.append_adjustment(tx.conn(), e, actor).await?;
                },
                DomainEvent::StockAllocated(e) => {
                    self.stock_items.append_allocation(tx.conn(), e, actor).await?;
                },
                DomainEvent::StockAllocationReleased(e) => {
                    self.stock_items
                        .append_allocation_release(tx.conn(), e, actor)
                        .await?;
                },
                _ => {},
            }
        }
        tx.collect(events)
    }
}

#[async_trait]
impl StockItemService for StockItemServiceImpl {
    async fn update_expiration_date(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
        request: UpdateExpirationDateRequest,
    ) -> Result<StockItemResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;
        let mut item = self
            .stock_items
            .find_by_id(tx.conn(), ctx.tenant_id, stock_item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Stock item {} not found", stock_item_id)))?;

        let today = Utc::now().date_naive();
        item.update_expiration_date(request.expiration_date, today)?;

        self.stock_items.update(tx.conn(), &mut item).await?;
        tx.collect(item.take_events())?;
        tx.commit().await?;

        Ok(StockItemResponse::from(&item))
    }

    async fn adjust_quantity(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
        request: AdjustStockQuantityRequest,
    ) -> Result<StockItemResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;
        let mut item = self.load_item(&mut tx, ctx.tenant_id, stock_item_id).await?;

        item.update_quantity(request.new_quantity, &request.reason)?;
        self.stock_items.update(tx.conn(), &mut item).await?;

        let events = item.take_events();
        self.persist_ledgers_and_collect(&mut tx, ctx.user_id, events).await?;

        // Quantity changes can cross a threshold in either direction; the
        // location scope is checked first and wins
        let mut scopes = vec![item.location_id];
        if item.location_id.is_some() {
            scopes.push(None);
        }
        for location_id in scopes {
            if let Some(event) = evaluate_stock_level(
                tx.conn(),
                self.thresholds.as_ref(),
                ctx.tenant_id,
                item.product_id,
                location_id,
            )
            .await?
            {
                tx.collect(vec![event])?;
                break;
            }
        }

        tx.commit().await?;
        Ok(StockItemResponse::from(&item))
    }

    async fn update_allocation(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
        request: UpdateAllocationRequest,
    ) -> Result<StockItemResponse> {
        request.validate()?;

        let mut tx = self.db.begin(ctx).await?;
        let mut item = self.load_item(&mut tx, ctx.tenant_id, stock_item_id).await?;

        item.update_allocated_quantity(request.allocated_quantity)?;
        self.stock_items.update(tx.conn(), &mut item).await?;

        let events = item.take_events();
        self.persist_ledgers_and_collect(&mut tx, ctx.user_id, events).await?;
        tx.commit().await?;

        Ok(StockItemResponse::from(&item))
    }
}

/// Read-side implementation over the stock read port, with best-effort
/// enrichment through the product catalog collaborator
pub struct StockQueriesImpl {
    db: TenantDb,
    reads: Arc<dyn StockReadPort>,
    locations: Arc<dyn LocationReadPort>,
    restock_reads: Arc<dyn RestockReadPort>,
    catalog: Option<Arc<dyn ProductCatalogPort>>,
}

impl StockQueriesImpl {
    pub fn new(
        db: TenantDb,
        reads: Arc<dyn StockReadPort>,
        locations: Arc<dyn LocationReadPort>,
        restock_reads: Arc<dyn RestockReadPort>,
        catalog: Option<Arc<dyn ProductCatalogPort>>,
    ) -> Self {
        Self {
            db,
            reads,
            locations,
            restock_reads,
            catalog,
        }
    }

    /// Catalog lookup that degrades to `None` with a warning instead of
    /// failing the query
    async fn product_metadata(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Option<wms_service_core::repositories::ProductMetadata> {
        let catalog = self.catalog.as_ref()?;
        match catalog.get_product(tenant_id, product_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Product metadata enrichment failed for {}: {}", product_id, e);
                None
            },
        }
    }
}

#[async_trait]
impl StockQueries for StockQueriesImpl {
    async fn get_stock_item(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
    ) -> Result<StockItemDetailResponse> {
        let item = self
            .reads
            .get(ctx, stock_item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Stock item {} not found", stock_item_id)))?;

        let product = self.product_metadata(ctx.tenant_id, item.product_id).await;
        let location = match item.location_id {
            Some(location_id) => match self.locations.get(ctx, location_id).await {
                Ok(location) => location,
                Err(e) => {
                    warn!("Location enrichment failed for {}: {}", location_id, e);
                    None
                },
            },
            None => None,
        };

        Ok(StockItemDetailResponse {
            item,
            product,
            location,
        })
    }

    async fn list_stock_items(
        &self,
        ctx: &TenantContext,
        filter: StockItemFilter,
    ) -> Result<Vec<StockItemResponse>> {
        self.reads.list(ctx, &filter).await
    }

    async fn stock_by_classification(
        &self,
        ctx: &TenantContext,
        classification: StockClassification,
    ) -> Result<Vec<StockItemResponse>> {
        self.reads.list_by_classification(ctx, classification).await
    }

    async fn fefo_stock_items(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Vec<StockItemResponse>> {
        self.reads.list_fefo(ctx, product_id, location_id).await
    }

    async fn expiring_stock(
        &self,
        ctx: &TenantContext,
        query: ExpiringStockQuery,
    ) -> Result<Vec<StockItemResponse>> {
        query.validate()?;
        self.reads.list_expiring(ctx, query.days_ahead, query.classification).await
    }

    async fn check_stock_expiration(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<StockExpirationCheckResponse> {
        let items = self.reads.list_at_location(ctx, product_id, location_id).await?;

        let mut response = StockExpirationCheckResponse {
            product_id,
            location_id,
            total_quantity: 0,
            expired_quantity: 0,
            critical_quantity: 0,
            near_expiry_quantity: 0,
            earliest_expiration: None,
        };
        for item in &items {
            response.total_quantity += item.quantity;
            match item.classification {
                StockClassification::Expired => response.expired_quantity += item.quantity,
                StockClassification::Critical => response.critical_quantity += item.quantity,
                StockClassification::NearExpiry => response.near_expiry_quantity += item.quantity,
                _ => {},
            }
            if let Some(expiration) = item.expiration_date {
                response.earliest_expiration = Some(match response.earliest_expiration {
                    Some(current) if current <= expiration => current,
                    _ => expiration,
                });
            }
        }
        Ok(response)
    }

    async fn stock_levels(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<StockLevelResponse> {
        let totals = self.reads.level_totals(ctx, product_id, location_id).await?;
        let thresholds = self.restock_reads.list_thresholds(ctx, Some(product_id)).await?;
        let threshold = best_threshold(&thresholds, location_id);

        let minimum = threshold.map(|t| t.minimum);
        let maximum = threshold.and_then(|t| t.maximum);
        let below_minimum = minimum.map(|m| totals.total_quantity < m).unwrap_or(false);
        let above_maximum = maximum.map(|m| totals.total_quantity > m).unwrap_or(false);

        // Observed breaches are reported even from the read side. There is
        // no surrounding transaction here, so this takes the degenerate
        // inline-publish path.
        if below_minimum {
            if let (Some(minimum), Some(threshold)) = (minimum, threshold) {
                self.db
                    .publish_detached(vec![DomainEvent::StockLevelBelowMinimum(
                        StockLevelBelowMinimumEvent {
                            tenant_id: ctx.tenant_id,
                            product_id,
                            location_id: threshold.location_id,
                            current_quantity: totals.total_quantity,
                            minimum_quantity: minimum,
                            maximum_quantity: threshold.maximum,
                        },
                    )])
                    .await;
            }
        }

        Ok(StockLevelResponse {
            product_id,
            location_id,
            total_quantity: totals.total_quantity,
            allocated_quantity: totals.allocated_quantity,
            available_quantity: totals.total_quantity - totals.allocated_quantity,
            minimum,
            maximum,
            below_minimum,
            above_maximum,
        })
    }
}

/// Location-scoped threshold first, product-wide as the fallback
fn best_threshold(
    thresholds: &[ThresholdResponse],
    location_id: Option<Uuid>,
) -> Option<&ThresholdResponse> {
    thresholds
        .iter()
        .find(|t| t.location_id.is_some() && t.location_id == location_id)
        .or_else(|| thresholds.iter().find(|t| t.location_id.is_none()))
}
