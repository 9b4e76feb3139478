//! Domain event definitions
//!
//! Events are collected on the aggregates during a command, drained by the
//! handler into the transaction scope, written to the outbox with the commit,
//! and relayed to NATS afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::LocationStatus;
use super::restock::RestockPriority;
use super::stock_item::StockClassification;
use super::stock_movement::MovementType;

/// Event type constants, used as outbox `event_type` and NATS subject suffix
pub mod event_types {
    pub const LOCATION_CREATED: &str = "location.created";
    pub const LOCATION_STATUS_CHANGED: &str = "location.status_changed";
    pub const LOCATION_ASSIGNED: &str = "location.assigned";
    pub const LOCATION_RELEASED: &str = "location.released";
    pub const STOCK_CLASSIFIED: &str = "stock.classified";
    pub const STOCK_EXPIRED: &str = "stock.expired";
    pub const STOCK_EXPIRING_ALERT: &str = "stock.expiring_alert";
    pub const LOCATION_ASSIGNED_TO_STOCK_ITEM: &str = "stock.location_assigned";
    pub const STOCK_MOVEMENT_INITIATED: &str = "stock_movement.initiated";
    pub const STOCK_MOVEMENT_COMPLETED: &str = "stock_movement.completed";
    pub const STOCK_MOVEMENT_CANCELLED: &str = "stock_movement.cancelled";
    pub const STOCK_ADJUSTED: &str = "stock.adjusted";
    pub const STOCK_ALLOCATED: &str = "stock.allocated";
    pub const STOCK_ALLOCATION_RELEASED: &str = "stock.allocation_released";
    pub const STOCK_LEVEL_BELOW_MINIMUM: &str = "stock.level_below_minimum";
    pub const STOCK_LEVEL_ABOVE_MAXIMUM: &str = "stock.level_above_maximum";
    pub const RESTOCK_REQUEST_GENERATED: &str = "restock.request_generated";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCreatedEvent {
    pub location_id: Uuid,
    pub tenant_id: Uuid,
    pub barcode: String,
    pub code: Option<String>,
    pub location_type: super::location::LocationType,
    pub parent_location_id: Option<Uuid>,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStatusChangedEvent {
    pub location_id: Uuid,
    pub tenant_id: Uuid,
    pub old_status: LocationStatus,
    pub new_status: LocationStatus,
    pub reason: Option<String>,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAssignedEvent {
    pub location_id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReleasedEvent {
    pub location_id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockClassifiedEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub old_classification: Option<StockClassification>,
    pub new_classification: StockClassification,
    pub expiration_date: Option<NaiveDate>,
    pub quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockExpiredEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub expiration_date: NaiveDate,
    pub quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockExpiringAlertEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub expiration_date: NaiveDate,
    pub days_until_expiry: i64,
    pub threshold_days: i64,
    pub quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAssignedToStockItemEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    pub classification: StockClassification,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovementInitiatedEvent {
    pub movement_id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub product_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovementCompletedEvent {
    pub movement_id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovementCancelledEvent {
    pub movement_id: Uuid,
    pub tenant_id: Uuid,
    pub reason: String,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustedEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub old_quantity: i64,
    pub new_quantity: i64,
    pub reason: String,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAllocatedEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub allocated_quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAllocationReleasedEvent {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub allocated_quantity: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevelBelowMinimumEvent {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub current_quantity: i64,
    pub minimum_quantity: i64,
    pub maximum_quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevelAboveMaximumEvent {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub current_quantity: i64,
    pub maximum_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockRequestGeneratedEvent {
    pub restock_request_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub requested_quantity: i64,
    pub priority: RestockPriority,
    pub version: i64,
}

/// Sum type over every event the core publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DomainEvent {
    #[serde(rename = "location.created")]
    LocationCreated(LocationCreatedEvent),
    #[serde(rename = "location.status_changed")]
    LocationStatusChanged(LocationStatusChangedEvent),
    #[serde(rename = "location.assigned")]
    LocationAssigned(LocationAssignedEvent),
    #[serde(rename = "location.released")]
    LocationReleased(LocationReleasedEvent),
    #[serde(rename = "stock.classified")]
    StockClassified(StockClassifiedEvent),
    #[serde(rename = "stock.expired")]
    StockExpired(StockExpiredEvent),
    #[serde(rename = "stock.expiring_alert")]
    StockExpiringAlert(StockExpiringAlertEvent),
    #[serde(rename = "stock.location_assigned")]
    LocationAssignedToStockItem(LocationAssignedToStockItemEvent),
    #[serde(rename = "stock_movement.initiated")]
    StockMovementInitiated(StockMovementInitiatedEvent),
    #[serde(rename = "stock_movement.completed")]
    StockMovementCompleted(StockMovementCompletedEvent),
    #[serde(rename = "stock_movement.cancelled")]
    StockMovementCancelled(StockMovementCancelledEvent),
    #[serde(rename = "stock.adjusted")]
    StockAdjusted(StockAdjustedEvent),
    #[serde(rename = "stock.allocated")]
    StockAllocated(StockAllocatedEvent),
    #[serde(rename = "stock.allocation_released")]
    StockAllocationReleased(StockAllocationReleasedEvent),
    #[serde(rename = "stock.level_below_minimum")]
    StockLevelBelowMinimum(StockLevelBelowMinimumEvent),
    #[serde(rename = "stock.level_above_maximum")]
    StockLevelAboveMaximum(StockLevelAboveMaximumEvent),
    #[serde(rename = "restock.request_generated")]
    RestockRequestGenerated(RestockRequestGeneratedEvent),
}

impl DomainEvent {
    /// Stable event type string, matching the `event_types` constants
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::LocationCreated(_) => event_types::LOCATION_CREATED,
            DomainEvent::LocationStatusChanged(_) => event_types::LOCATION_STATUS_CHANGED,
            DomainEvent::LocationAssigned(_) => event_types::LOCATION_ASSIGNED,
            DomainEvent::LocationReleased(_) => event_types::LOCATION_RELEASED,
            DomainEvent::StockClassified(_) => event_types::STOCK_CLASSIFIED,
            DomainEvent::StockExpired(_) => event_types::STOCK_EXPIRED,
            DomainEvent::StockExpiringAlert(_) => event_types::STOCK_EXPIRING_ALERT,
            DomainEvent::LocationAssignedToStockItem(_) => {
                event_types::LOCATION_ASSIGNED_TO_STOCK_ITEM
            },
            DomainEvent::StockMovementInitiated(_) => event_types::STOCK_MOVEMENT_INITIATED,
            DomainEvent::StockMovementCompleted(_) => event_types::STOCK_MOVEMENT_COMPLETED,
            DomainEvent::StockMovementCancelled(_) => event_types::STOCK_MOVEMENT_CANCELLED,
            DomainEvent::StockAdjusted(_) => event_types::STOCK_ADJUSTED,
            DomainEvent::StockAllocated(_) => event_types::STOCK_ALLOCATED,
            DomainEvent::StockAllocationReleased(_) => event_types::STOCK_ALLOCATION_RELEASED,
            DomainEvent::StockLevelBelowMinimum(_) => event_types::STOCK_LEVEL_BELOW_MINIMUM,
            DomainEvent::StockLevelAboveMaximum(_) => event_types::STOCK_LEVEL_ABOVE_MAXIMUM,
            DomainEvent::RestockRequestGenerated(_) => event_types::RESTOCK_REQUEST_GENERATED,
        }
    }

    /// Tenant the event belongs to
    pub fn tenant_id(&self) -> Uuid {
        match self {
            DomainEvent::LocationCreated(e) => e.tenant_id,
            DomainEvent::LocationStatusChanged(e) => e.tenant_id,
            DomainEvent::LocationAssigned(e) => e.tenant_id,
            DomainEvent::LocationReleased(e) => e.tenant_id,
            DomainEvent::StockClassified(e) => e.tenant_id,
            DomainEvent::StockExpired(e) => e.tenant_id,
            DomainEvent::StockExpiringAlert(e) => e.tenant_id,
            DomainEvent::LocationAssignedToStockItem(e) => e.tenant_id,
            DomainEvent::StockMovementInitiated(e) => e.tenant_id,
            DomainEvent::StockMovementCompleted(e) => e.tenant_id,
            DomainEvent::StockMovementCancelled(e) => e.tenant_id,
            DomainEvent::StockAdjusted(e) => e.tenant_id,
            DomainEvent::StockAllocated(e) => e.tenant_id,
            DomainEvent::StockAllocationReleased(e) => e.tenant_id,
            DomainEvent::StockLevelBelowMinimum(e) => e.tenant_id,
            DomainEvent::StockLevelAboveMaximum(e) => e.tenant_id,
            DomainEvent::RestockRequestGenerated(e) => e.tenant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serde_tag() {
        let event = DomainEvent::StockLevelBelowMinimum(StockLevelBelowMinimumEvent {
            tenant_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            location_id: None,
            current_quantity: 3,
            minimum_quantity: 10,
            maximum_quantity: Some(50),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], event.kind());
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = DomainEvent::LocationStatusChanged(LocationStatusChangedEvent {
            location_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            old_status: LocationStatus::Available,
            new_status: LocationStatus::Blocked,
            reason: Some("damaged racking".to_string()),
            version: 3,
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
