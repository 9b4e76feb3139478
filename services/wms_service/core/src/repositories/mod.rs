//! Port definitions for persistence, read models, eventing, and external
//! collaborators
//!
//! Write repositories operate on a borrowed connection whose `search_path`
//! has been routed to the tenant schema by the transaction scope. Read-model
//! ports take the tenant context directly and return plain records.

pub mod consignment;
pub mod location;
pub mod outbox;
pub mod product_catalog;
pub mod read_model;
pub mod restock;
pub mod stock_item;
pub mod stock_movement;

// Re-export repository traits for convenience
pub use consignment::ConsignmentRepository;
pub use location::LocationRepository;
pub use outbox::EventOutbox;
pub use product_catalog::{ProductCatalogPort, ProductMetadata};
pub use read_model::{
    ConsignmentReadPort, LocationReadPort, RestockReadPort, StockLevelTotals, StockReadPort,
};
pub use restock::{RestockRequestRepository, ThresholdRepository};
pub use stock_item::StockItemRepository;
pub use stock_movement::StockMovementRepository;
