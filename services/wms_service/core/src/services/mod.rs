//! Service trait definitions and the FEFO planner
//!
//! Command services own the seven-step handler template: validate, load,
//! invoke domain logic, collect events, persist, schedule post-commit
//! publish, return the result. Query services sit on the read-model ports.

pub mod consignment;
pub mod fefo;
pub mod location;
pub mod restock;
pub mod stock_item;
pub mod stock_movement;

pub use consignment::{ConsignmentQueries, ConsignmentService};
pub use location::{LocationQueries, LocationService};
pub use restock::RestockService;
pub use stock_item::{StockItemService, StockQueries};
pub use stock_movement::StockMovementService;
