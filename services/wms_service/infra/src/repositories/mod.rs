//! PostgreSQL repository implementations
//!
//! All SQL is unqualified: the transaction scope routes `search_path` to the
//! tenant schema before any repository call, and the per-tenant namespace
//! requires runtime-built queries rather than the compile-time macros.

pub mod consignment;
pub mod location;
pub mod outbox;
pub mod restock;
pub mod stock_item;
pub mod stock_movement;

pub use consignment::{PgConsignmentReadPort, PgConsignmentRepository};
pub use location::{PgLocationReadPort, PgLocationRepository};
pub use outbox::PgEventOutbox;
pub use restock::{PgRestockReadPort, PgRestockRequestRepository, PgThresholdRepository};
pub use stock_item::{PgStockItemRepository, PgStockReadPort};
pub use stock_movement::PgStockMovementRepository;

use shared_error::AppError;

/// Map a unique-constraint violation onto the Conflict taxonomy; everything
/// else stays a database error
pub(crate) fn map_insert_error(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Conflict(format!("{} already exists", what));
        }
    }
    AppError::Database(err)
}
