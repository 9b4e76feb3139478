//! Service implementations
//!
//! Command services follow the handler template end to end: validate, open a
//! tenant transaction, invoke the aggregates, persist, collect the events
//! into the transaction scope, commit (staging the events for publication),
//! and return plain response records. Query services sit on the read ports.

pub mod cache;
pub mod consignment;
pub mod location;
pub mod restock;
pub mod stock_item;
pub mod stock_level;
pub mod stock_movement;

#[cfg(test)]
mod location_queries_tests;
#[cfg(test)]
mod stock_queries_tests;

// Re-export services for convenience
pub use cache::{CachedLocationReadPort, LocationCache};
pub use consignment::{ConsignmentQueriesImpl, ConsignmentServiceImpl};
pub use location::{LocationQueriesImpl, LocationServiceImpl};
pub use restock::RestockServiceImpl;
pub use stock_item::{StockItemServiceImpl, StockQueriesImpl};
pub use stock_movement::StockMovementServiceImpl;
