//! Transactional outbox port
//!
//! Events buffered during a command are written here inside the committing
//! transaction; a background worker relays them to the broker afterwards.

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domains::events::DomainEvent;
use crate::Result;

#[async_trait]
pub trait EventOutbox: Send + Sync {
    /// Insert an event into the outbox table, returning its outbox id
    async fn enqueue(&self, conn: &mut PgConnection, event: &DomainEvent) -> Result<Uuid>;
}
