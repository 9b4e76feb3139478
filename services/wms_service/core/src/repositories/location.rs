//! Repository port for the location aggregate

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domains::location::Location;
use crate::Result;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Insert a freshly created location
    async fn insert(&self, conn: &mut PgConnection, location: &Location) -> Result<()>;

    /// Persist aggregate changes with optimistic locking; a stale version
    /// fails with a concurrency error. The in-memory version is bumped on
    /// success.
    async fn update(&self, conn: &mut PgConnection, location: &mut Location) -> Result<()>;

    async fn find_by_id(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<Location>>;

    async fn find_by_barcode(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        barcode: &str,
    ) -> Result<Option<Location>>;

    async fn find_by_code(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Option<Location>>;

    /// BIN locations eligible for FEFO assignment (AVAILABLE or RESERVED)
    async fn find_assignable_bins(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Location>>;
}
