//! Transactional outbox adapter

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use shared_events::EventEnvelope;
use wms_service_core::domains::events::DomainEvent;
use wms_service_core::repositories::EventOutbox;
use wms_service_core::Result;

/// Writes domain events into `public.event_outbox` inside the committing
/// transaction. The relay worker publishes and marks them afterwards.
pub struct PgEventOutbox;

#[async_trait]
impl EventOutbox for PgEventOutbox {
    async fn enqueue(&self, conn: &mut PgConnection, event: &DomainEvent) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let envelope = EventEnvelope::new(event.kind(), event);
        let payload = serde_json::to_value(&envelope)?;

        sqlx::query(
            r#"
            INSERT INTO public.event_outbox (id, tenant_id, event_type, event_data)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(event.tenant_id())
        .bind(event.kind())
        .bind(payload)
        .execute(conn)
        .await?;

        Ok(id)
    }
}
