//! Restock request service
//!
//! Generation is event-driven: the NATS consumer feeds
//! `StockLevelBelowMinimum` events into `handle_stock_level_below_minimum`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::events::StockLevelBelowMinimumEvent;
use wms_service_core::domains::restock::{RestockRequest, StockLevelThreshold};
use wms_service_core::dto::{
    MarkRestockSentRequest, RestockFilter, RestockRequestResponse, ThresholdResponse,
    UpsertThresholdRequest,
};
use wms_service_core::repositories::{
    RestockReadPort, RestockRequestRepository, ThresholdRepository,
};
use wms_service_core::services::RestockService;
use wms_service_core::Result;

use crate::tenant::TenantDb;

/// PostgreSQL implementation of RestockService
pub struct RestockServiceImpl {
    db: TenantDb,
    restocks: Arc<dyn RestockRequestRepository>,
    thresholds: Arc<dyn ThresholdRepository>,
    reads: Arc<dyn RestockReadPort>,
}

impl RestockServiceImpl {
    pub fn new(
        db: TenantDb,
        restocks: Arc<dyn RestockRequestRepository>,
        thresholds: Arc<dyn ThresholdRepository>,
        reads: Arc<dyn RestockReadPort>,
    ) -> Self {
        Self {
            db,
            restocks,
            thresholds,
            reads,
        }
    }

    /// Load a request, apply a domain operation, persist, and publish
    async fn mutate<F>(
        &self,
        ctx: &TenantContext,
        restock_request_id: Uuid,
        op: F,
    ) -> Result<RestockRequestResponse>
    where
        F: FnOnce(&mut RestockRequest) -> Result<()> + Send,
    {
        let mut tx = self.db.begin(ctx).await?;
        let mut request = self
            .restocks
            .find_by_id(tx.conn(), ctx.tenant_id, restock_request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Restock request {} not found", restock_request_id))
            })?;

        op(&mut request)?;

        self.restocks.update(tx.conn(), &mut request).await?;
        tx.collect(request.take_events())?;
        tx.commit().await?;

        Ok(RestockRequestResponse::from(&request))
    }
}

#[async_trait]
impl RestockService for RestockServiceImpl {
    async fn handle_stock_level_below_minimum(
        &self,
        event: StockLevelBelowMinimumEvent,
    ) -> Result<Option<RestockRequestResponse>> {
        // Consumer-side commands run as the system actor of the tenant
        let ctx = TenantContext::new(event.tenant_id, Uuid::nil(), vec![]);
        let mut tx = self.db.begin(&ctx).await?;

        if let Some(threshold) = self
            .thresholds
            .find_best_match(tx.conn(), event.tenant_id, event.product_id, event.location_id)
            .await?
        {
            if !threshold.enable_auto_restock {
                info!(
                    product_id = %event.product_id,
                    "Auto-restock disabled; below-minimum event ignored"
                );
                return Ok(None);
            }
        }

        // At most one active request per (product, location); a duplicate
        // event refreshes the existing one
        let existing = self
            .restocks
            .find_active(tx.conn(), event.tenant_id, event.product_id, event.location_id)
            .await?;

        let request = match existing {
            Some(mut request) => {
                request.refresh_levels(event.current_quantity)?;
                self.restocks.update(tx.conn(), &mut request).await?;
                tx.collect(request.take_events())?;
                request
            },
            None => {
                let mut request = RestockRequest::generate(
                    event.tenant_id,
                    event.product_id,
                    event.location_id,
                    event.current_quantity,
                    event.minimum_quantity,
                    event.maximum_quantity,
                )?;
                self.restocks.insert(tx.conn(), &request).await?;
                tx.collect(request.take_events())?;
                request
            },
        };

        tx.commit().await?;
        Ok(Some(RestockRequestResponse::from(&request)))
    }

    async fn mark_sent(
        &self,
        ctx: &TenantContext,
        restock_request_id: Uuid,
        request: MarkRestockSentRequest,
    ) -> Result<RestockRequestResponse> {
        request.validate()?;
        self.mutate(ctx, restock_request_id, |r| r.mark_as_sent(&request.order_reference))
            .await
    }

    async fn mark_fulfilled(
        &self,
        ctx: &TenantContext,
        restock_request_id: Uuid,
    ) -> Result<RestockRequestResponse> {
        self.mutate(ctx, restock_request_id, |r| r.mark_as_fulfilled()).await
    }

    async fn cancel(
        &self,
        ctx: &TenantContext,
        restock_request_id: Uuid,
    ) -> Result<RestockRequestResponse> {
        self.mutate(ctx, restock_request_id, |r| r.cancel()).await
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        filter: RestockFilter,
        page: PageParams,
    ) -> Result<Page<RestockRequestResponse>> {
        self.reads.list(ctx, &filter, page).await
    }

    async fn upsert_threshold(
        &self,
        ctx: &TenantContext,
        request: UpsertThresholdRequest,
    ) -> Result<ThresholdResponse> {
        request.validate()?;

        let threshold = StockLevelThreshold::new(
            ctx.tenant_id,
            request.product_id,
            request.location_id,
            request.minimum,
            request.maximum,
            request.enable_auto_restock,
        )?;

        let mut tx = self.db.begin(ctx).await?;
        let stored = self.thresholds.upsert(tx.conn(), &threshold).await?;
        tx.commit().await?;

        Ok(ThresholdResponse::from(&stored))
    }

    async fn list_thresholds(
        &self,
        ctx: &TenantContext,
        product_id: Option<Uuid>,
    ) -> Result<Vec<ThresholdResponse>> {
        self.reads.list_thresholds(ctx, product_id).await
    }
}
