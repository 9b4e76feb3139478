//! OpenAPI documentation aggregation

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::locations::create_location,
        handlers::locations::update_location_status,
        handlers::locations::block_location,
        handlers::locations::unblock_location,
        handlers::locations::reserve_location,
        handlers::locations::release_location,
        handlers::locations::assign_locations_fefo,
        handlers::locations::get_location,
        handlers::locations::list_locations,
        handlers::locations::available_locations,
        handlers::locations::location_hierarchy,
        handlers::stock_items::update_expiration_date,
        handlers::stock_items::adjust_quantity,
        handlers::stock_items::update_allocation,
        handlers::stock_items::get_stock_item,
        handlers::stock_items::list_stock_items,
        handlers::stock_items::stock_by_classification,
        handlers::stock_items::fefo_stock_items,
        handlers::stock_items::expiring_stock,
        handlers::stock_items::check_stock_expiration,
        handlers::stock_items::stock_levels,
        handlers::stock_movements::create_movement,
        handlers::stock_movements::complete_movement,
        handlers::stock_movements::cancel_movement,
        handlers::restock::mark_sent,
        handlers::restock::mark_fulfilled,
        handlers::restock::cancel,
        handlers::restock::list,
        handlers::restock::upsert_threshold,
        handlers::restock::list_thresholds,
        handlers::consignments::receive_consignment,
        handlers::consignments::list_consignments,
    ),
    components(schemas(handlers::ErrorResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "locations", description = "Location hierarchy and status management"),
        (name = "stock-items", description = "Stock items, classification, and levels"),
        (name = "stock-movements", description = "Two-phase stock movement workflow"),
        (name = "restock", description = "Restock requests and thresholds"),
        (name = "consignments", description = "Inbound consignments"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
