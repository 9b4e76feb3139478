//! Consignment intake and query services

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::consignment::Consignment;
use wms_service_core::dto::{
    ConsignmentDetailResponse, ConsignmentFilter, ConsignmentResponse,
    ReceiveConsignmentRequest, StockItemResponse,
};
use wms_service_core::repositories::{
    ConsignmentReadPort, ConsignmentRepository, StockItemRepository, ThresholdRepository,
};
use wms_service_core::services::{ConsignmentQueries, ConsignmentService};
use wms_service_core::{Result, StockItem};

use crate::services::stock_level::evaluate_stock_level;
use crate::tenant::TenantDb;

/// PostgreSQL implementation of ConsignmentService
pub struct ConsignmentServiceImpl {
    db: TenantDb,
    consignments: Arc<dyn ConsignmentRepository>,
    stock_items: Arc<dyn StockItemRepository>,
    thresholds: Arc<dyn ThresholdRepository>,
}

impl ConsignmentServiceImpl {
    pub fn new(
        db: TenantDb,
        consignments: Arc<dyn ConsignmentRepository>,
        stock_items: Arc<dyn StockItemRepository>,
        thresholds: Arc<dyn ThresholdRepository>,
    ) -> Self {
        Self {
            db,
            consignments,
            stock_items,
            thresholds,
        }
    }
}

#[async_trait]
impl ConsignmentService for ConsignmentServiceImpl {
    async fn receive_consignment(
        &self,
        ctx: &TenantContext,
        request: ReceiveConsignmentRequest,
    ) -> Result<ConsignmentDetailResponse> {
        request.validate()?;
        for line in &request.items {
            line.validate()?;
        }

        let mut tx = self.db.begin(ctx).await?;

        if self
            .consignments
            .find_by_number(tx.conn(), ctx.tenant_id, &request.consignment_number)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Consignment {} already exists",
                request.consignment_number
            )));
        }

        let consignment = Consignment::new(
            ctx.tenant_id,
            request.consignment_number,
            request.supplier_reference,
            request.expected_arrival,
        );
        self.consignments.insert(tx.conn(), &consignment).await?;

        let today = Utc::now().date_naive();
        let mut responses = Vec::with_capacity(request.items.len());
        let mut products: HashSet<Uuid> = HashSet::new();

        for line in request.items {
            let mut item = StockItem::create(
                ctx.tenant_id,
                line.product_id,
                consignment.consignment_id,
                line.quantity,
                line.expiration_date,
                today,
            )?;
            self.stock_items.insert(tx.conn(), &item).await?;
            tx.collect(item.take_events())?;
            products.insert(line.product_id);
            responses.push(StockItemResponse::from(&item));
        }

        // Intake can push a product over its configured maximum
        for product_id in products {
            if let Some(event) = evaluate_stock_level(
                tx.conn(),
                self.thresholds.as_ref(),
                ctx.tenant_id,
                product_id,
                None,
            )
            .await?
            {
                tx.collect(vec![event])?;
            }
        }

        tx.commit().await?;

        Ok(ConsignmentDetailResponse {
            consignment: ConsignmentResponse::from(&consignment),
            items: responses,
        })
    }
}

/// Read-side implementation over the consignment read port
pub struct ConsignmentQueriesImpl {
    reads: Arc<dyn ConsignmentReadPort>,
}

impl ConsignmentQueriesImpl {
    pub fn new(reads: Arc<dyn ConsignmentReadPort>) -> Self {
        Self { reads }
    }
}

#[async_trait]
impl ConsignmentQueries for ConsignmentQueriesImpl {
    async fn list_consignments(
        &self,
        ctx: &TenantContext,
        filter: ConsignmentFilter,
        page: PageParams,
    ) -> Result<Page<ConsignmentResponse>> {
        self.reads.list(ctx, &filter, page).await
    }
}
