//! Tenant-scoped transaction handling
//!
//! Every command runs inside a [`TenantTransaction`]: the borrowed
//! connection has its `search_path` routed to the validated tenant schema,
//! domain events are buffered on the scope, and `commit` writes the buffer
//! to the transactional outbox before committing. A rolled-back transaction
//! drops the buffer with it.

use once_cell::sync::Lazy;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_db::TenantSchema;
use shared_error::AppError;
use shared_events::{subject_for, EventEnvelope, NatsClient};
use shared_types::TenantContext;
use wms_service_core::domains::events::DomainEvent;
use wms_service_core::repositories::EventOutbox;
use wms_service_core::Result;

use crate::repositories::outbox::PgEventOutbox;

/// DDL applied to every tenant schema before first use
const TENANT_SCHEMA_SQL: &str = include_str!("../migrations/tenant_schema.sql");
/// DDL for the shared outbox table, applied once at startup
const PUBLIC_OUTBOX_SQL: &str = include_str!("../migrations/public_outbox.sql");

/// Schemas already provisioned by this process
static MIGRATED_SCHEMAS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Ensure the shared outbox table exists. Called once at startup.
pub async fn ensure_outbox(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(PUBLIC_OUTBOX_SQL).execute(pool).await?;
    Ok(())
}

/// Factory for tenant-scoped transactions
#[derive(Clone)]
pub struct TenantDb {
    pool: PgPool,
    outbox: Arc<dyn EventOutbox>,
    nats: Option<Arc<NatsClient>>,
}

impl TenantDb {
    pub fn new(pool: PgPool, nats: Option<Arc<NatsClient>>) -> Self {
        Self {
            pool,
            outbox: Arc::new(PgEventOutbox),
            nats,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction routed to the tenant's schema. The schema is
    /// created and migrated on first use.
    pub async fn begin(&self, ctx: &TenantContext) -> Result<TenantTransaction> {
        let schema = TenantSchema::for_tenant(ctx.tenant_id);
        // The derivation above always produces a valid name; parse anyway so
        // nothing unvalidated ever reaches SQL.
        let schema = TenantSchema::parse(schema.as_str())?;

        self.ensure_schema(&schema).await?;

        let mut tx = self.pool.begin().await?;
        let set_path = format!("SET LOCAL search_path TO {}, public", schema.quoted());
        sqlx::query(&set_path).execute(&mut *tx).await?;
        debug!(tenant_id = %ctx.tenant_id, schema = %schema, "Tenant transaction started");

        Ok(TenantTransaction {
            tx,
            tenant_id: ctx.tenant_id,
            schema,
            events: Vec::new(),
            outbox: Arc::clone(&self.outbox),
        })
    }

    /// Publish events with no surrounding transaction. This is a degenerate
    /// path: delivery is fire-and-forget with no outbox backing, so the
    /// anomaly is logged before publishing.
    pub async fn publish_detached(&self, events: Vec<DomainEvent>) {
        if events.is_empty() {
            return;
        }
        warn!(
            count = events.len(),
            "Publishing domain events outside a transaction; no outbox backing"
        );
        let Some(nats) = &self.nats else {
            warn!("NATS not configured; detached events dropped");
            return;
        };
        for event in events {
            let kind = event.kind();
            let envelope = EventEnvelope::new(kind, &event);
            if let Err(e) = nats.publish_event(&subject_for(kind), envelope).await {
                warn!("Failed to publish detached event {}: {}", kind, e);
            }
        }
    }

    async fn ensure_schema(&self, schema: &TenantSchema) -> Result<()> {
        let mut migrated = MIGRATED_SCHEMAS.lock().await;
        if migrated.contains(schema.as_str()) {
            return Ok(());
        }

        let create = format!("CREATE SCHEMA IF NOT EXISTS {}", schema.quoted());
        sqlx::query(&create).execute(&self.pool).await?;

        let mut conn = self.pool.acquire().await?;
        let set_path = format!("SET search_path TO {}, public", schema.quoted());
        sqlx::query(&set_path).execute(&mut *conn).await?;
        sqlx::raw_sql(TENANT_SCHEMA_SQL).execute(&mut *conn).await?;
        sqlx::query("SET search_path TO public").execute(&mut *conn).await?;

        info!(schema = %schema, "Tenant schema provisioned");
        migrated.insert(schema.as_str().to_string());
        Ok(())
    }
}

/// A tenant-scoped transaction with an append-only domain event buffer
pub struct TenantTransaction {
    tx: Transaction<'static, Postgres>,
    tenant_id: Uuid,
    schema: TenantSchema,
    events: Vec<DomainEvent>,
    outbox: Arc<dyn EventOutbox>,
}

impl TenantTransaction {
    /// The routed connection for repository calls
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    pub fn schema(&self) -> &TenantSchema {
        &self.schema
    }

    /// Buffer events drained from an aggregate. An event carrying a foreign
    /// tenant id is unrecoverable and aborts the command.
    pub fn collect(&mut self, events: Vec<DomainEvent>) -> Result<()> {
        for event in &events {
            if event.tenant_id() != self.tenant_id {
                return Err(AppError::TenantMismatch {
                    expected: self.tenant_id.to_string(),
                    actual: event.tenant_id().to_string(),
                });
            }
        }
        self.events.extend(events);
        Ok(())
    }

    /// Write the buffered events to the outbox and commit. The outbox rows
    /// commit atomically with the aggregate changes; the relay worker
    /// publishes them afterwards. Dropping the transaction instead rolls
    /// everything back, events included.
    pub async fn commit(mut self) -> Result<Vec<DomainEvent>> {
        for event in &self.events {
            self.outbox.enqueue(&mut self.tx, event).await?;
        }
        self.tx.commit().await?;
        debug!(
            tenant_id = %self.tenant_id,
            events = self.events.len(),
            "Transaction committed; events staged for publication"
        );
        Ok(self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_scripts_are_non_empty() {
        assert!(TENANT_SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS locations"));
        assert!(PUBLIC_OUTBOX_SQL.contains("event_outbox"));
    }
}
