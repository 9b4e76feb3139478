//! Outbox relay worker
//!
//! Polls `public.event_outbox` and publishes pending events to NATS. Rows
//! are locked with SKIP LOCKED so multiple service instances can relay
//! concurrently; events that keep failing end up in the `failed`
//! (dead-letter) status for operator attention.

use serde_json::Value;
use sqlx::PgPool;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};
use uuid::Uuid;

use shared_error::AppError;
use shared_events::{subject_for, NatsClient};

/// Configuration for the outbox worker
#[derive(Debug, Clone)]
pub struct OutboxWorkerConfig {
    /// How often to poll for new events (in seconds)
    pub poll_interval_seconds: u64,
    /// Maximum number of events to process in one batch
    pub batch_size: i64,
    /// Maximum number of publish attempts per event
    pub max_retries: i32,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 5,
            batch_size: 50,
            max_retries: 3,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    event_type: String,
    event_data: Value,
    retry_count: i32,
}

/// Start the outbox worker loop
pub async fn start_outbox_worker(
    pool: PgPool,
    nats: NatsClient,
    config: OutboxWorkerConfig,
) -> Result<(), AppError> {
    info!("Starting outbox worker with config: {:?}", config);

    let mut interval = time::interval(Duration::from_secs(config.poll_interval_seconds));
    loop {
        interval.tick().await;
        if let Err(e) = process_pending_events(&pool, &nats, &config).await {
            error!("Error processing pending events: {}", e);
        }
    }
}

/// Publish one batch of pending events
async fn process_pending_events(
    pool: &PgPool,
    nats: &NatsClient,
    config: &OutboxWorkerConfig,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let events = sqlx::query_as::<_, OutboxRow>(
        r#"
        SELECT id, event_type, event_data, retry_count
        FROM public.event_outbox
        WHERE status = 'pending'
        ORDER BY created_at ASC
        LIMIT $1
        FOR UPDATE SKIP LOCKED
        "#,
    )
    .bind(config.batch_size)
    .fetch_all(&mut *tx)
    .await?;

    if events.is_empty() {
        return Ok(());
    }
    info!("Processing {} pending events", events.len());

    for event in events {
        let subject = subject_for(&event.event_type);
        let payload = serde_json::to_vec(&event.event_data)?;

        match nats.publish_raw(&subject, payload).await {
            Ok(_) => {
                sqlx::query(
                    r#"
                    UPDATE public.event_outbox
                    SET status = 'published', published_at = NOW(), updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(event.id)
                .execute(&mut *tx)
                .await?;
                info!("Published event {} to subject {}", event.id, subject);
            },
            Err(e) => {
                let new_retry_count = event.retry_count + 1;
                if new_retry_count >= config.max_retries {
                    sqlx::query(
                        r#"
                        UPDATE public.event_outbox
                        SET status = 'failed', retry_count = $2, error_message = $3,
                            updated_at = NOW()
                        WHERE id = $1
                        "#,
                    )
                    .bind(event.id)
                    .bind(new_retry_count)
                    .bind(format!(
                        "Failed to publish after {} retries: {}",
                        config.max_retries, e
                    ))
                    .execute(&mut *tx)
                    .await?;
                    error!(
                        "Event {} failed permanently after {} retries",
                        event.id, config.max_retries
                    );
                } else {
                    sqlx::query(
                        r#"
                        UPDATE public.event_outbox
                        SET retry_count = $2, error_message = $3, updated_at = NOW()
                        WHERE id = $1
                        "#,
                    )
                    .bind(event.id)
                    .bind(new_retry_count)
                    .bind(format!("Publish attempt {} failed: {}", new_retry_count, e))
                    .execute(&mut *tx)
                    .await?;
                }
            },
        }
    }

    tx.commit().await?;
    Ok(())
}
