//! PostgreSQL adapters for consignments

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::consignment::Consignment;
use wms_service_core::dto::{ConsignmentFilter, ConsignmentResponse};
use wms_service_core::repositories::{ConsignmentReadPort, ConsignmentRepository};
use wms_service_core::Result;

use super::map_insert_error;

const CONSIGNMENT_COLUMNS: &str = "consignment_id, tenant_id, consignment_number, \
     supplier_reference, expected_arrival, status, created_at, last_modified_at, version";

/// PostgreSQL implementation of ConsignmentRepository
pub struct PgConsignmentRepository;

#[async_trait]
impl ConsignmentRepository for PgConsignmentRepository {
    async fn insert(&self, conn: &mut PgConnection, consignment: &Consignment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO consignments (
                consignment_id, tenant_id, consignment_number, supplier_reference,
                expected_arrival, status, created_at, last_modified_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(consignment.consignment_id)
        .bind(consignment.tenant_id)
        .bind(&consignment.consignment_number)
        .bind(&consignment.supplier_reference)
        .bind(consignment.expected_arrival)
        .bind(consignment.status)
        .bind(consignment.created_at)
        .bind(consignment.last_modified_at)
        .bind(consignment.version)
        .execute(conn)
        .await
        .map_err(|e| map_insert_error(e, "A consignment with this number"))?;

        Ok(())
    }

    async fn find_by_number(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        consignment_number: &str,
    ) -> Result<Option<Consignment>> {
        let row = sqlx::query_as::<_, Consignment>(&format!(
            "SELECT {} FROM consignments WHERE tenant_id = $1 AND consignment_number = $2",
            CONSIGNMENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(consignment_number)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }
}

/// PostgreSQL implementation of the consignment read port
pub struct PgConsignmentReadPort {
    pool: PgPool,
}

impl PgConsignmentReadPort {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsignmentReadPort for PgConsignmentReadPort {
    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &ConsignmentFilter,
        page: PageParams,
    ) -> Result<Page<ConsignmentResponse>> {
        let (page_number, page_size) = page.normalized();
        let schema = shared_db::TenantSchema::for_tenant(ctx.tenant_id);
        let table = format!("{}.consignments", schema.quoted());

        let mut where_clause = String::from("tenant_id = $1");
        if filter.status.is_some() {
            where_clause.push_str(" AND status = $2");
        }

        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            CONSIGNMENT_COLUMNS,
            table,
            where_clause,
            page_size,
            page.offset()
        );
        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, where_clause);

        let mut select = sqlx::query_as::<_, Consignment>(&select_sql).bind(ctx.tenant_id);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.tenant_id);
        if let Some(status) = filter.status {
            select = select.bind(status);
            count = count.bind(status);
        }

        let rows = select.fetch_all(&self.pool).await?;
        let total = count.fetch_one(&self.pool).await?;

        Ok(Page::new(
            rows.iter().map(ConsignmentResponse::from).collect(),
            total,
            page_number,
            page_size,
        ))
    }
}
