//! PostgreSQL adapters for the location aggregate and its read port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::location::{
    Capacity, Coordinates, Location, LocationStatus, LocationType,
};
use wms_service_core::dto::{LocationFilter, LocationResponse};
use wms_service_core::repositories::{LocationRepository, LocationReadPort};
use wms_service_core::Result;

use super::map_insert_error;

const LOCATION_COLUMNS: &str = "location_id, tenant_id, parent_location_id, code, name, barcode, \
     location_type, coordinates, status, capacity_current, capacity_maximum, description, \
     created_at, last_modified_at, version";

#[derive(sqlx::FromRow)]
struct LocationRow {
    location_id: Uuid,
    tenant_id: Uuid,
    parent_location_id: Option<Uuid>,
    code: Option<String>,
    name: Option<String>,
    barcode: String,
    location_type: LocationType,
    coordinates: Option<serde_json::Value>,
    status: LocationStatus,
    capacity_current: i64,
    capacity_maximum: Option<i64>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
    version: i64,
}

impl LocationRow {
    fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates.clone().and_then(|v| serde_json::from_value(v).ok())
    }

    fn into_aggregate(self) -> Location {
        let coordinates = self.coordinates();
        Location::from_storage(
            self.location_id,
            self.tenant_id,
            self.parent_location_id,
            self.code,
            self.name,
            self.barcode,
            self.location_type,
            coordinates,
            self.status,
            Capacity {
                current: self.capacity_current,
                maximum: self.capacity_maximum,
            },
            self.description,
            self.created_at,
            self.last_modified_at,
            self.version,
        )
    }

    fn into_response(self) -> LocationResponse {
        let coordinates = self.coordinates();
        LocationResponse {
            location_id: self.location_id,
            tenant_id: self.tenant_id,
            parent_location_id: self.parent_location_id,
            code: self.code,
            name: self.name,
            barcode: self.barcode,
            location_type: self.location_type,
            coordinates,
            status: self.status,
            capacity_current: self.capacity_current,
            capacity_maximum: self.capacity_maximum,
            description: self.description,
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
            version: self.version,
        }
    }
}

/// PostgreSQL implementation of LocationRepository
pub struct PgLocationRepository;

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn insert(&self, conn: &mut PgConnection, location: &Location) -> Result<()> {
        let coordinates = location
            .coordinates
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO locations (
                location_id, tenant_id, parent_location_id, code, name, barcode,
                location_type, coordinates, status, capacity_current, capacity_maximum,
                description, created_at, last_modified_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(location.location_id)
        .bind(location.tenant_id)
        .bind(location.parent_location_id)
        .bind(&location.code)
        .bind(&location.name)
        .bind(&location.barcode)
        .bind(location.location_type)
        .bind(coordinates)
        .bind(location.status)
        .bind(location.capacity.current)
        .bind(location.capacity.maximum)
        .bind(&location.description)
        .bind(location.created_at)
        .bind(location.last_modified_at)
        .bind(location.version)
        .execute(conn)
        .await
        .map_err(|e| map_insert_error(e, "A location with this barcode or code"))?;

        Ok(())
    }

    async fn update(&self, conn: &mut PgConnection, location: &mut Location) -> Result<()> {
        let coordinates = location
            .coordinates
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE locations
            SET parent_location_id = $3, code = $4, name = $5, coordinates = $6,
                status = $7, capacity_current = $8, capacity_maximum = $9,
                description = $10, last_modified_at = $11, version = version + 1
            WHERE tenant_id = $1 AND location_id = $2 AND version = $12
            "#,
        )
        .bind(location.tenant_id)
        .bind(location.location_id)
        .bind(location.parent_location_id)
        .bind(&location.code)
        .bind(&location.name)
        .bind(coordinates)
        .bind(location.status)
        .bind(location.capacity.current)
        .bind(location.capacity.maximum)
        .bind(&location.description)
        .bind(location.last_modified_at)
        .bind(location.version)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ConcurrentModification(format!(
                "Location {} was modified concurrently",
                location.location_id
            )));
        }
        location.version += 1;
        Ok(())
    }

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations WHERE tenant_id = $1 AND location_id = $2",
            LOCATION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(location_id)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(LocationRow::into_aggregate))
    }

    async fn find_by_barcode(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        barcode: &str,
    ) -> Result<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations WHERE tenant_id = $1 AND barcode = $2",
            LOCATION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(barcode)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(LocationRow::into_aggregate))
    }

    async fn find_by_code(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations WHERE tenant_id = $1 AND code = $2",
            LOCATION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(code)
        .fetch_optional(conn)
        .await?;

        Ok(row.map(LocationRow::into_aggregate))
    }

    async fn find_assignable_bins(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations \
             WHERE tenant_id = $1 AND location_type = 'bin' \
               AND status IN ('available', 'reserved') \
             ORDER BY barcode",
            LOCATION_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(conn)
        .await?;

        Ok(rows.into_iter().map(LocationRow::into_aggregate).collect())
    }
}

/// PostgreSQL implementation of the location read port
pub struct PgLocationReadPort {
    pool: PgPool,
}

impl PgLocationReadPort {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn table(ctx: &TenantContext) -> String {
        let schema = shared_db::TenantSchema::for_tenant(ctx.tenant_id);
        format!("{}.locations", schema.quoted())
    }
}

#[async_trait]
impl LocationReadPort for PgLocationReadPort {
    async fn get(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
    ) -> Result<Option<LocationResponse>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM {} WHERE tenant_id = $1 AND location_id = $2",
            LOCATION_COLUMNS,
            Self::table(ctx)
        ))
        .bind(ctx.tenant_id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LocationRow::into_response))
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &LocationFilter,
        page: PageParams,
    ) -> Result<Page<LocationResponse>> {
        let (page_number, page_size) = page.normalized();
        let table = Self::table(ctx);

        let mut where_clause = String::from("tenant_id = $1");
        let mut next_bind = 2;
        if filter.location_type.is_some() {
            where_clause.push_str(&format!(" AND location_type = ${}", next_bind));
            next_bind += 1;
        }
        if filter.status.is_some() {
            where_clause.push_str(&format!(" AND status = ${}", next_bind));
            next_bind += 1;
        }
        if filter.parent_location_id.is_some() {
            where_clause.push_str(&format!(" AND parent_location_id = ${}", next_bind));
        }

        let select_sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY barcode LIMIT {} OFFSET {}",
            LOCATION_COLUMNS,
            table,
            where_clause,
            page_size,
            page.offset()
        );
        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, where_clause);

        let mut select = sqlx::query_as::<_, LocationRow>(&select_sql).bind(ctx.tenant_id);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.tenant_id);
        if let Some(location_type) = filter.location_type {
            select = select.bind(location_type);
            count = count.bind(location_type);
        }
        if let Some(status) = filter.status {
            select = select.bind(status);
            count = count.bind(status);
        }
        if let Some(parent) = filter.parent_location_id {
            select = select.bind(parent);
            count = count.bind(parent);
        }

        let rows = select.fetch_all(&self.pool).await?;
        let total = count.fetch_one(&self.pool).await?;

        Ok(Page::new(
            rows.into_iter().map(LocationRow::into_response).collect(),
            total,
            page_number,
            page_size,
        ))
    }

    async fn list_available(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>> {
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM {} WHERE tenant_id = $1 AND status = 'available' ORDER BY barcode",
            LOCATION_COLUMNS,
            Self::table(ctx)
        ))
        .bind(ctx.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LocationRow::into_response).collect())
    }

    async fn list_all(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>> {
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM {} WHERE tenant_id = $1 ORDER BY barcode",
            LOCATION_COLUMNS,
            Self::table(ctx)
        ))
        .bind(ctx.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LocationRow::into_response).collect())
    }
}
