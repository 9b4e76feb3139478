//! NATS event consumers
//!
//! Restock generation is a reaction to `StockLevelBelowMinimum` events
//! flowing back out of the event pipeline.

use std::sync::Arc;
use tracing::{error, info};

use shared_error::AppError;
use shared_events::{get_nats_client, init_nats_client, subject_for, EventEnvelope};
use wms_service_core::domains::events::{event_types, StockLevelBelowMinimumEvent};
use wms_service_core::services::RestockService;

/// Initialize the NATS client and start the event consumers
pub async fn init_event_consumers(
    nats_url: &str,
    restock_service: Arc<dyn RestockService>,
) -> Result<(), AppError> {
    init_nats_client(nats_url).await?;
    start_below_minimum_consumer(restock_service).await?;
    info!("Event consumers initialized successfully");
    Ok(())
}

/// Consume below-minimum events and feed the restock service
async fn start_below_minimum_consumer(
    restock_service: Arc<dyn RestockService>,
) -> Result<(), AppError> {
    let nats_client = get_nats_client().await?;
    let subject = subject_for(event_types::STOCK_LEVEL_BELOW_MINIMUM);

    nats_client
        .subscribe_event(
            &subject,
            move |envelope: EventEnvelope<StockLevelBelowMinimumEvent>| {
                let restock_service = Arc::clone(&restock_service);
                async move {
                    let event = envelope.data;
                    let product_id = event.product_id;
                    match restock_service.handle_stock_level_below_minimum(event).await {
                        Ok(Some(request)) => info!(
                            restock_request_id = %request.restock_request_id,
                            %product_id,
                            "Restock request generated or refreshed"
                        ),
                        Ok(None) => info!(%product_id, "Below-minimum event ignored"),
                        Err(e) => {
                            error!("Failed to handle below-minimum event: {}", e)
                        },
                    }
                }
            },
        )
        .await?;

    info!("Subscribed to {}", subject);
    Ok(())
}
