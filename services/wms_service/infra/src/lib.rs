//! WMS Service Infrastructure
//!
//! Concrete implementations of the core's ports: tenant-routed PostgreSQL
//! repositories, command/query services, the transactional outbox, the
//! Redis location cache, and the HTTP product catalog adapter.
//!
//! ## Architecture
//!
//! - `tenant`: schema routing, provisioning, and the transaction scope
//! - `repositories/`: PostgreSQL repository and read-port implementations
//! - `services/`: service implementations with business logic
//! - `external/`: adapters for collaborator services

pub mod external;
pub mod repositories;
pub mod services;
pub mod tenant;

// Re-export main implementations for convenience
pub use external::HttpProductCatalog;
pub use repositories::{
    PgConsignmentReadPort, PgConsignmentRepository, PgEventOutbox, PgLocationReadPort,
    PgLocationRepository, PgRestockReadPort, PgRestockRequestRepository, PgStockItemRepository,
    PgStockMovementRepository, PgStockReadPort, PgThresholdRepository,
};
pub use services::{
    CachedLocationReadPort, ConsignmentQueriesImpl, ConsignmentServiceImpl, LocationCache,
    LocationQueriesImpl, LocationServiceImpl, RestockServiceImpl, StockItemServiceImpl,
    StockMovementServiceImpl, StockQueriesImpl,
};
pub use tenant::{ensure_outbox, TenantDb, TenantTransaction};
