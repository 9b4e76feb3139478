//! Repository port for consignments

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domains::consignment::Consignment;
use crate::Result;

#[async_trait]
pub trait ConsignmentRepository: Send + Sync {
    async fn insert(&self, conn: &mut PgConnection, consignment: &Consignment) -> Result<()>;

    async fn find_by_number(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        consignment_number: &str,
    ) -> Result<Option<Consignment>>;
}
