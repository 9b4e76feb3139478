//! WMS Service Core
//!
//! This crate contains the business logic, domain aggregates, and trait
//! definitions for the warehouse management core. It has no infrastructure
//! dependencies beyond the sqlx connection types referenced by the
//! repository ports.
//!
//! ## Architecture
//!
//! - `domains/`: Aggregates, domain events, and pure domain functions
//! - `dto/`: Data Transfer Objects for the command/query surface
//! - `repositories/`: Write repository and read-model port definitions
//! - `services/`: Command/query service trait definitions and the FEFO planner

pub mod domains;
pub mod dto;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use domains::events::DomainEvent;
pub use domains::location::{Location, LocationStatus, LocationType};
pub use domains::stock_item::{classify, StockClassification, StockItem};
pub use domains::stock_movement::{MovementStatus, MovementType, StockMovement};
pub use domains::restock::{RestockPriority, RestockRequest, RestockStatus, StockLevelThreshold};
pub use services::fefo::{plan_assignments, BinCandidate, FefoAssignmentRequest, FefoPlan};

// Re-export shared error types
pub use shared_error::AppError;
pub use shared_types::TenantContext;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
