//! PostgreSQL adapters for the stock item aggregate, its ledgers, and the
//! stock read port

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared_error::AppError;
use shared_types::TenantContext;
use wms_service_core::domains::events::{
    StockAdjustedEvent, StockAllocatedEvent, StockAllocationReleasedEvent,
};
use wms_service_core::domains::stock_item::{classify, StockClassification, StockItem};
use wms_service_core::dto::{StockItemFilter, StockItemResponse};
use wms_service_core::repositories::{StockItemRepository, StockLevelTotals, StockReadPort};
use wms_service_core::Result;

const STOCK_ITEM_COLUMNS: &str = "stock_item_id, tenant_id, product_id, consignment_id, \
     location_id, quantity, allocated_quantity, expiration_date, created_at, \
     last_modified_at, version";

#[derive(sqlx::FromRow)]
struct StockItemRow {
    stock_item_id: Uuid,
    tenant_id: Uuid,
    product_id: Uuid,
    consignment_id: Uuid,
    location_id: Option<Uuid>,
    quantity: i64,
    allocated_quantity: i64,
    expiration_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
    version: i64,
}

impl StockItemRow {
    /// Classification is recomputed against today on reload; the stored
    /// column only serves the read-side filters
    fn into_aggregate(self, today: NaiveDate) -> StockItem {
        StockItem::from_storage(
            self.stock_item_id,
            self.tenant_id,
            self.product_id,
            self.consignment_id,
            self.location_id,
            self.quantity,
            self.allocated_quantity,
            self.expiration_date,
            self.created_at,
            self.last_modified_at,
            self.version,
            today,
        )
    }

    fn into_response(self, today: NaiveDate) -> StockItemResponse {
        StockItemResponse {
            stock_item_id: self.stock_item_id,
            tenant_id: self.tenant_id,
            product_id: self.product_id,
            consignment_id: self.consignment_id,
            location_id: self.location_id,
            quantity: self.quantity,
            allocated_quantity: self.allocated_quantity,
            available_quantity: self.quantity - self.allocated_quantity,
            expiration_date: self.expiration_date,
            classification: classify(self.expiration_date, today),
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
            version: self.version,
        }
    }
}

/// PostgreSQL implementation of StockItemRepository
pub struct PgStockItemRepository;

#[async_trait]
impl StockItemRepository for PgStockItemRepository {
    async fn insert(&self, conn: &mut PgConnection, item: &StockItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_items (
                stock_item_id, tenant_id, product_id, consignment_id, location_id,
                quantity, allocated_quantity, expiration_date, classification,
                created_at, last_modified_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.stock_item_id)
        .bind(item.tenant_id)
        .bind(item.product_id)
        .bind(item.consignment_id)
        .bind(item.location_id)
        .bind(item.quantity)
        .bind(item.allocated_quantity)
        .bind(item.expiration_date)
        .bind(item.classification)
        .bind(item.created_at)
        .bind(item.last_modified_at)
        .bind(item.version)
        .execute(conn)
        .await?;

        Ok(())
    }

    async fn update(&self, conn: &mut PgConnection, item: &mut StockItem) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_items
            SET location_id = $3, quantity = $4, allocated_quantity = $5,
                expiration_date = $6, classification = $7, last_modified_at = $8,
                version = version + 1
            WHERE tenant_id = $1 AND stock_item_id = $2 AND version = $9
            "#,
        )
        .bind(item.tenant_id)
        .bind(item.stock_item_id)
        .bind(item.location_id)
        .bind(item.quantity)
        .bind(item.allocated_quantity)
        .bind(item.expiration_date)
        .bind(item.classification)
        .bind(item.last_modified_at)
        .bind(item.version)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConcurrentModification(format!(
                "Stock item {} was modified concurrently",
                item.stock_item_id
            )));
        }
        item.version += 1;
        Ok(())
    }

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        stock_item_id: Uuid,
    ) -> Result<Option<StockItem>> {
        let row = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM stock_items WHERE tenant_id = $1 AND stock_item_id = $2",
            STOCK_ITEM_COLUMNS
        ))
        .bind(tenant_id)
        .bind(stock_item_id)
        .fetch_optional(conn)
        .await?;

        let today = Utc::now().date_naive();
        Ok(row.map(|r| r.into_aggregate(today)))
    }

    async fn find_by_product_and_location(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<StockItem>> {
        let rows = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM stock_items \
             WHERE tenant_id = $1 AND product_id = $2 AND location_id = $3 \
             ORDER BY expiration_date ASC NULLS LAST, created_at ASC",
            STOCK_ITEM_COLUMNS
        ))
        .bind(tenant_id)
        .bind(product_id)
        .bind(location_id)
        .fetch_all(conn)
        .await?;

        let today = Utc::now().date_naive();
        Ok(rows.into_iter().map(|r| r.into_aggregate(today)).collect())
    }

    async fn find_by_product(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockItem>> {
        let rows = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM stock_items \
             WHERE tenant_id = $1 AND product_id = $2 \
             ORDER BY expiration_date ASC NULLS LAST, created_at ASC",
            STOCK_ITEM_COLUMNS
        ))
        .bind(tenant_id)
        .bind(product_id)
        .fetch_all(conn)
        .await?;

        let today = Utc::now().date_naive();
        Ok(rows.into_iter().map(|r| r.into_aggregate(today)).collect())
    }

    async fn append_adjustment(
        &self,
        conn: &mut PgConnection,
        event: &StockAdjustedEvent,
        adjusted_by: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_adjustments (
                adjustment_id, tenant_id, stock_item_id, product_id,
                old_quantity, new_quantity, reason, adjusted_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(event.tenant_id)
        .bind(event.stock_item_id)
        .bind(event.product_id)
        .bind(event.old_quantity)
        .bind(event.new_quantity)
        .bind(&event.reason)
        .bind(adjusted_by)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(())
    }

    async fn append_allocation(
        &self,
        conn: &mut PgConnection,
        event: &StockAllocatedEvent,
        allocated_by: Uuid,
    ) -> Result<()> {
        insert_allocation_row(
            conn,
            event.tenant_id,
            event.stock_item_id,
            event.product_id,
            event.quantity,
            event.allocated_quantity,
            allocated_by,
        )
        .await
    }

    async fn append_allocation_release(
        &self,
        conn: &mut PgConnection,
        event: &StockAllocationReleasedEvent,
        released_by: Uuid,
    ) -> Result<()> {
        insert_allocation_row(
            conn,
            event.tenant_id,
            event.stock_item_id,
            event.product_id,
            -event.quantity,
            event.allocated_quantity,
            released_by,
        )
        .await
    }
}

async fn insert_allocation_row(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    stock_item_id: Uuid,
    product_id: Uuid,
    quantity_delta: i64,
    allocated_quantity: i64,
    allocated_by: Uuid,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_allocations (
            allocation_id, tenant_id, stock_item_id, product_id,
            quantity_delta, allocated_quantity, allocated_by, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(tenant_id)
    .bind(stock_item_id)
    .bind(product_id)
    .bind(quantity_delta)
    .bind(allocated_quantity)
    .bind(allocated_by)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

/// PostgreSQL implementation of the stock read port
pub struct PgStockReadPort {
    pool: PgPool,
}

impl PgStockReadPort {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn table(ctx: &TenantContext) -> String {
        let schema = shared_db::TenantSchema::for_tenant(ctx.tenant_id);
        format!("{}.stock_items", schema.quoted())
    }
}

#[async_trait]
impl StockReadPort for PgStockReadPort {
    async fn get(
        &self,
        ctx: &TenantContext,
        stock_item_id: Uuid,
    ) -> Result<Option<StockItemResponse>> {
        let row = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM {} WHERE tenant_id = $1 AND stock_item_id = $2",
            STOCK_ITEM_COLUMNS,
            Self::table(ctx)
        ))
        .bind(ctx.tenant_id)
        .bind(stock_item_id)
        .fetch_optional(&self.pool)
        .await?;

        let today = Utc::now().date_naive();
        Ok(row.map(|r| r.into_response(today)))
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &StockItemFilter,
    ) -> Result<Vec<StockItemResponse>> {
        let mut where_clause = String::from("tenant_id = $1");
        let mut next_bind = 2;
        if filter.product_id.is_some() {
            where_clause.push_str(&format!(" AND product_id = ${}", next_bind));
            next_bind += 1;
        }
        if filter.location_id.is_some() {
            where_clause.push_str(&format!(" AND location_id = ${}", next_bind));
            next_bind += 1;
        }
        if filter.consignment_id.is_some() {
            where_clause.push_str(&format!(" AND consignment_id = ${}", next_bind));
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY expiration_date ASC NULLS LAST, created_at ASC",
            STOCK_ITEM_COLUMNS,
            Self::table(ctx),
            where_clause
        );

        let mut query = sqlx::query_as::<_, StockItemRow>(&sql).bind(ctx.tenant_id);
        if let Some(product_id) = filter.product_id {
            query = query.bind(product_id);
        }
        if let Some(location_id) = filter.location_id {
            query = query.bind(location_id);
        }
        if let Some(consignment_id) = filter.consignment_id {
            query = query.bind(consignment_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let today = Utc::now().date_naive();
        let mut items: Vec<StockItemResponse> =
            rows.into_iter().map(|r| r.into_response(today)).collect();

        // Classification filtering happens against the freshly computed
        // label, not the stored column, so a stale row cannot leak through
        if let Some(classification) = filter.classification {
            items.retain(|i| i.classification == classification);
        }
        Ok(items)
    }

    async fn list_by_classification(
        &self,
        ctx: &TenantContext,
        classification: StockClassification,
    ) -> Result<Vec<StockItemResponse>> {
        let filter = StockItemFilter {
            classification: Some(classification),
            ..Default::default()
        };
        self.list(ctx, &filter).await
    }

    async fn list_fefo(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Vec<StockItemResponse>> {
        let filter = StockItemFilter {
            product_id: Some(product_id),
            location_id,
            ..Default::default()
        };
        let items = self.list(ctx, &filter).await?;
        Ok(items
            .into_iter()
            .filter(|i| i.classification != StockClassification::Expired && i.available_quantity > 0)
            .collect())
    }

    async fn list_expiring(
        &self,
        ctx: &TenantContext,
        days_ahead: i64,
        classification: Option<StockClassification>,
    ) -> Result<Vec<StockItemResponse>> {
        let today = Utc::now().date_naive();
        let horizon = today + chrono::Duration::days(days_ahead);

        let rows = sqlx::query_as::<_, StockItemRow>(&format!(
            "SELECT {} FROM {} \
             WHERE tenant_id = $1 AND expiration_date IS NOT NULL AND expiration_date <= $2 \
             ORDER BY expiration_date ASC, created_at ASC",
            STOCK_ITEM_COLUMNS,
            Self::table(ctx)
        ))
        .bind(ctx.tenant_id)
        .bind(horizon)
        .fetch_all(&self.pool)
        .await?;

        let mut items: Vec<StockItemResponse> =
            rows.into_iter().map(|r| r.into_response(today)).collect();
        if let Some(classification) = classification {
            items.retain(|i| i.classification == classification);
        }
        Ok(items)
    }

    async fn list_at_location(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<StockItemResponse>> {
        let filter = StockItemFilter {
            product_id: Some(product_id),
            location_id: Some(location_id),
            ..Default::default()
        };
        self.list(ctx, &filter).await
    }

    async fn level_totals(
        &self,
        ctx: &TenantContext,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<StockLevelTotals> {
        let table = Self::table(ctx);
        let (sql, bind_location) = match location_id {
            Some(_) => (
                format!(
                    "SELECT COALESCE(SUM(quantity), 0)::BIGINT, COALESCE(SUM(allocated_quantity), 0)::BIGINT \
                     FROM {} WHERE tenant_id = $1 AND product_id = $2 AND location_id = $3",
                    table
                ),
                true,
            ),
            None => (
                format!(
                    "SELECT COALESCE(SUM(quantity), 0)::BIGINT, COALESCE(SUM(allocated_quantity), 0)::BIGINT \
                     FROM {} WHERE tenant_id = $1 AND product_id = $2",
                    table
                ),
                false,
            ),
        };

        let mut query = sqlx::query_as::<_, (i64, i64)>(&sql).bind(ctx.tenant_id).bind(product_id);
        if bind_location {
            query = query.bind(location_id);
        }
        let (total_quantity, allocated_quantity) = query.fetch_one(&self.pool).await?;

        Ok(StockLevelTotals {
            total_quantity,
            allocated_quantity,
        })
    }
}
