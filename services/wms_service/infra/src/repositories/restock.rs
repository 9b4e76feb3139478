//! PostgreSQL adapters for restock requests, thresholds, and their read port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::restock::{
    RestockPriority, RestockRequest, RestockStatus, StockLevelThreshold,
};
use wms_service_core::dto::{RestockFilter, RestockRequestResponse, ThresholdResponse};
use wms_service_core::repositories::{
    RestockReadPort, RestockRequestRepository, ThresholdRepository,
};
use wms_service_core::Result;

use super::map_insert_error;

const RESTOCK_COLUMNS: &str = "restock_request_id, tenant_id, product_id, location_id, \
     current_quantity, minimum_quantity, maximum_quantity, requested_quantity, priority, \
     status, created_at, sent_at, order_reference, last_modified_at, version";

#[derive(sqlx::FromRow)]
struct RestockRow {
    restock_request_id: Uuid,
    tenant_id: Uuid,
    product_id: Uuid,
    location_id: Option<Uuid>,
    current_quantity: i64,
    minimum_quantity: i64,
    maximum_quantity: Option<i64>,
    requested_quantity: i64,
    priority: RestockPriority,
    status: RestockStatus,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
    order_reference: Option<String>,
    last_modified_at: DateTime<Utc>,
    version: i64,
}

impl RestockRow {
    fn into_aggregate(self) -> RestockRequest {
        RestockRequest::from_storage(
            self.restock_request_id,
            self.tenant_id,
            self.product_id,
            self.location_id,
            self.current_quantity,
            self.minimum_quantity,
            self.maximum_quantity,
            self.requested_quantity,
            self.priority,
            self.status,
            self.created_at,
            self.sent_at,
            self.order_reference,
            self.last_modified_at,
            self.version,
        )
    }

    fn into_response(self) -> RestockRequestResponse {
        RestockRequestResponse {
            restock_request_id: self.restock_request_id,
            tenant_id: self.tenant_id,
            product_id: self.product_id,
            location_id: self.location_id,
            current_quantity: self.current_quantity,
            minimum_quantity: self.minimum_quantity,
            maximum_quantity: self.maximum_quantity,
            requested_quantity: self.requested_quantity,
            priority: self.priority,
            status: self.status,
            created_at: self.created_at,
            sent_at: self.sent_at,
            order_reference: self.order_reference,
            version: self.version,
        }
    }
}

/// PostgreSQL implementation of RestockRequestRepository
pub struct PgRestockRequestRepository;

#[async_trait]
impl RestockRequestRepository for PgRestockRequestRepository {
    async fn insert(&self, conn: &mut PgConnection, request: &RestockRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO restock_requests (
                restock_request_id, tenant_id, product_id, location_id,
                current_quantity, minimum_quantity, maximum_quantity,
                requested_quantity, priority, status, created_at, sent_at,
                order_reference, last_modified_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(request.restock_request_id)
        .bind(request.tenant_id)
        .bind(request.product_id)
        .bind(request.location_id)
        .bind(request.current_quantity)
        .bind(request.minimum_quantity)
        .bind(request.maximum_quantity)
        .bind(request.requested_quantity)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.sent_at)
        .bind(&request.order_reference)
        .bind(request.last_modified_at)
        .bind(request.version)
        .execute(conn)
        .await
        .map_err(|e| map_insert_error(e, "An active restock request for this product"))?;

        Ok(())
    }

    async fn update(&self, conn: &mut PgConnection, request: &mut RestockRequest) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE restock_requests
            SET current_quantity = $3, requested_quantity = $4, priority = $5,
                status = $6, sent_at = $7, order_reference = $8,
                last_modified_at = $9, version = version + 1
            WHERE tenant_id = $1 AND restock_request_id = $2 AND version = $10
            "#,
        )
        .bind(request.tenant_id)
        .bind(request.restock_request_id)
        .bind(request.current_quantity)
        .bind(request.requested_quantity)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.sent_at)
        .bind(&request.order_reference)
        .bind(request.last_modified_at)
        .bind(request.version)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConcurrentModification(format!(
                "Restock request {} was modified concurrently",
                request.restock_request_id
            )));
        }
        request.version += 1;
        Ok(())
    }

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        restock_request_id: Uuid,
    ) -> Result<Option<RestockRequest>> {
        let row = sqlx::query_as::<_, RestockRow>(&format!(
            "SELECT {} FROM restock_requests \
             WHERE tenant_id = $1 AND restock_request_id = $2",
            RESTOCK_COLUMNS
        ))
        .bind(tenant_id)
        .bind(restock_request_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(RestockRow::into_aggregate))
    }

    async fn find_active(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<RestockRequest>> {
        let row = sqlx::query_as::<_, RestockRow>(&format!(
            "SELECT {} FROM restock_requests \
             WHERE tenant_id = $1 AND product_id = $2 \
               AND location_id IS NOT DISTINCT FROM $3 \
               AND status IN ('pending', 'sent_to_d365')",
            RESTOCK_COLUMNS
        ))
        .bind(tenant_id)
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(RestockRow::into_aggregate))
    }
}

/// PostgreSQL implementation of ThresholdRepository
pub struct PgThresholdRepository;

#[async_trait]
impl ThresholdRepository for PgThresholdRepository {
    async fn upsert(
        &self,
        conn: &mut PgConnection,
        threshold: &StockLevelThreshold,
    ) -> Result<StockLevelThreshold> {
        let row = sqlx::query_as::<_, StockLevelThreshold>(
            r#"
            INSERT INTO stock_level_thresholds (
                threshold_id, tenant_id, product_id, location_id, minimum,
                maximum, enable_auto_restock, created_at, last_modified_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (tenant_id, product_id,
                         COALESCE(location_id, '00000000-0000-0000-0000-000000000000'::uuid))
            DO UPDATE SET
                minimum = EXCLUDED.minimum,
                maximum = EXCLUDED.maximum,
                enable_auto_restock = EXCLUDED.enable_auto_restock,
                last_modified_at = EXCLUDED.last_modified_at,
                version = stock_level_thresholds.version + 1
            RETURNING threshold_id, tenant_id, product_id, location_id, minimum,
                      maximum, enable_auto_restock, created_at, last_modified_at, version
            "#,
        )
        .bind(threshold.threshold_id)
        .bind(threshold.tenant_id)
        .bind(threshold.product_id)
        .bind(threshold.location_id)
        .bind(threshold.minimum)
        .bind(threshold.maximum)
        .bind(threshold.enable_auto_restock)
        .bind(threshold.created_at)
        .bind(threshold.last_modified_at)
        .bind(threshold.version)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }

    async fn find_best_match(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<StockLevelThreshold>> {
        // Prefer the location-scoped threshold, fall back to product-wide
        let row = sqlx::query_as::<_, StockLevelThreshold>(
            r#"
            SELECT threshold_id, tenant_id, product_id, location_id, minimum,
                   maximum, enable_auto_restock, created_at, last_modified_at, version
            FROM stock_level_thresholds
            WHERE tenant_id = $1 AND product_id = $2
              AND (location_id IS NOT DISTINCT FROM $3 OR location_id IS NULL)
            ORDER BY location_id NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }
}

/// PostgreSQL implementation of the restock read port
pub struct PgRestockReadPort {
    pool: PgPool,
}

impl PgRestockReadPort {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn schema(ctx: &TenantContext) -> shared_db::TenantSchema {
        shared_db::TenantSchema::for_tenant(ctx.tenant_id)
    }
}

#[async_trait]
impl RestockReadPort for PgRestockReadPort {
    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &RestockFilter,
        page: PageParams,
    ) -> Result<Page<RestockRequestResponse>> {
        let (page_number, page_size) = page.normalized();
        let table = format!("{}.restock_requests", Self::schema(ctx).quoted());

        let mut where_clause = String::from("tenant_id = $1");
        let mut next_bind = 2;
        if filter.status.is_some() {
            where_clause.push_str(&format!(" AND status = ${}", next_bind));
            next_bind += 1;
        }
        if filter.priority.is_some() {
            where_clause.push_str(&format!(" AND priority = ${}", next_bind));
            next_bind += 1;
        }
        if filter.product_id.is_some() {
            where_clause.push_str(&format!(" AND product_id = ${}", next_bind));
        }

        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            RESTOCK_COLUMNS,
            table,
            where_clause,
            page_size,
            page.offset()
        );
        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, where_clause);

        let mut select = sqlx::query_as::<_, RestockRow>(&select_sql).bind(ctx.tenant_id);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.tenant_id);
        if let Some(status) = filter.status {
            select = select.bind(status);
            count = count.bind(status);
        }
        if let Some(priority) = filter.priority {
            select = select.bind(priority);
            count = count.bind(priority);
        }
        if let Some(product_id) = filter.product_id {
            select = select.bind(product_id);
            count = count.bind(product_id);
        }

        let rows = select.fetch_all(&self.pool).await?;
        let total = count.fetch_one(&self.pool).await?;

        Ok(Page::new(
            rows.into_iter().map(RestockRow::into_response).collect(),
            total,
            page_number,
            page_size,
        ))
    }

    async fn list_thresholds(
        &self,
        ctx: &TenantContext,
        product_id: Option<Uuid>,
    ) -> Result<Vec<ThresholdResponse>> {
        let table = format!("{}.stock_level_thresholds", Self::schema(ctx).quoted());
        let sql = match product_id {
            Some(_) => format!(
                "SELECT threshold_id, tenant_id, product_id, location_id, minimum, \
                 maximum, enable_auto_restock, created_at, last_modified_at, version \
                 FROM {} WHERE tenant_id = $1 AND product_id = $2 ORDER BY created_at",
                table
            ),
            None => format!(
                "SELECT threshold_id, tenant_id, product_id, location_id, minimum, \
                 maximum, enable_auto_restock, created_at, last_modified_at, version \
                 FROM {} WHERE tenant_id = $1 ORDER BY created_at",
                table
            ),
        };

        let mut query = sqlx::query_as::<_, StockLevelThreshold>(&sql).bind(ctx.tenant_id);
        if let Some(product_id) = product_id {
            query = query.bind(product_id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(ThresholdResponse::from).collect())
    }
}
