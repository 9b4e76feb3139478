//! HTTP handlers, grouped by aggregate

pub mod consignments;
pub mod health;
pub mod locations;
pub mod restock;
pub mod stock_items;
pub mod stock_movements;

/// Error response shape for OpenAPI documentation
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}
