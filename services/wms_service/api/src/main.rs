//! WMS Service Main Application
//!
//! Entry point: configuration, database pool, outbox provisioning, NATS
//! wiring, and the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use shared_config::Config;
use shared_db::init_pool;
use shared_events::NatsClient;
use wms_service_api::{consumers, create_router, worker};
use wms_service_infra::{
    ensure_outbox, PgRestockReadPort, PgRestockRequestRepository, PgThresholdRepository,
    RestockServiceImpl, TenantDb,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wms_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool and the shared outbox table
    let pool = init_pool(&config.database_url, config.max_connections.unwrap_or(10)).await?;
    ensure_outbox(&pool).await?;

    // Connect to NATS when configured; the service runs without event
    // publishing otherwise
    let nats = match &config.nats_url {
        Some(nats_url) => match NatsClient::connect(nats_url).await {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!("Failed to connect to NATS: {}", e);
                tracing::warn!("Service will start without event processing capabilities");
                None
            },
        },
        None => None,
    };

    if let (Some(nats), Some(nats_url)) = (&nats, &config.nats_url) {
        // Restock generation consumer
        let restock_service = Arc::new(RestockServiceImpl::new(
            TenantDb::new(pool.clone(), Some(Arc::clone(nats))),
            Arc::new(PgRestockRequestRepository),
            Arc::new(PgThresholdRepository),
            Arc::new(PgRestockReadPort::new(pool.clone())),
        ));
        if let Err(e) = consumers::init_event_consumers(nats_url, restock_service).await {
            tracing::error!("Failed to initialize NATS event consumers: {}", e);
        }

        // Outbox relay worker
        let worker_config = worker::OutboxWorkerConfig {
            poll_interval_seconds: config.outbox_poll_seconds,
            ..Default::default()
        };
        let worker_pool = pool.clone();
        let worker_nats = nats.as_ref().clone();
        tokio::spawn(async move {
            if let Err(e) =
                worker::start_outbox_worker(worker_pool, worker_nats, worker_config).await
            {
                tracing::error!("Outbox worker failed: {}", e);
            }
        });
        tracing::info!("Outbox worker started");
    }

    // Create the application router
    let app = create_router(pool, &config, nats).await;

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("WMS service listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
