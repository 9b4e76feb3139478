//! Data Transfer Objects for the command/query surface
//!
//! Queries never return domain aggregates; they return the plain records
//! defined here.

pub mod consignment;
pub mod location;
pub mod restock;
pub mod stock_item;
pub mod stock_movement;

pub use consignment::*;
pub use location::*;
pub use restock::*;
pub use stock_item::*;
pub use stock_movement::*;
