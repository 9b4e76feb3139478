//! Stock movement aggregate
//!
//! Cancellable two-phase workflow: INITIATED -> COMPLETED | CANCELLED. The
//! cross-aggregate capacity and quantity effects of completion are applied by
//! the movement service inside one tenant transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_error::AppError;

use super::events::{
    DomainEvent, StockMovementCancelledEvent, StockMovementCompletedEvent,
    StockMovementInitiatedEvent,
};
use crate::Result;

/// Movement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum MovementStatus {
    Initiated,
    Completed,
    Cancelled,
}

/// Movement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum MovementType {
    Putaway,
    Pick,
    #[default]
    Transfer,
    Replenishment,
    Return,
    Adjustment,
}

/// Stock movement aggregate root
#[derive(Debug, Clone, Serialize)]
pub struct StockMovement {
    pub movement_id: Uuid,
    pub tenant_id: Uuid,
    pub stock_item_id: Uuid,
    pub product_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub reason: Option<String>,
    pub status: MovementStatus,
    pub initiated_by: Uuid,
    pub initiated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub version: i64,

    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl StockMovement {
    /// Initiate a movement. Location existence, destination capacity, and
    /// stock availability are checked by the movement service before this is
    /// called.
    #[allow(clippy::too_many_arguments)]
    pub fn initiate(
        tenant_id: Uuid,
        stock_item_id: Uuid,
        product_id: Uuid,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        quantity: i64,
        movement_type: MovementType,
        reason: Option<String>,
        initiated_by: Uuid,
    ) -> Result<Self> {
        if source_location_id == destination_location_id {
            return Err(AppError::ValidationError(
                "Source and destination locations must differ".to_string(),
            ));
        }
        if quantity <= 0 {
            return Err(AppError::ValidationError(
                "Movement quantity must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let mut movement = Self {
            movement_id: Uuid::now_v7(),
            tenant_id,
            stock_item_id,
            product_id,
            source_location_id,
            destination_location_id,
            quantity,
            movement_type,
            reason,
            status: MovementStatus::Initiated,
            initiated_by,
            initiated_at: now,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            version: 1,
            events: Vec::new(),
        };

        movement.record(DomainEvent::StockMovementInitiated(StockMovementInitiatedEvent {
            movement_id: movement.movement_id,
            tenant_id: movement.tenant_id,
            stock_item_id: movement.stock_item_id,
            product_id: movement.product_id,
            source_location_id: movement.source_location_id,
            destination_location_id: movement.destination_location_id,
            quantity: movement.quantity,
            movement_type: movement.movement_type,
            version: movement.version,
        }));
        Ok(movement)
    }

    /// Rebuild from stored state. Never emits events.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        movement_id: Uuid,
        tenant_id: Uuid,
        stock_item_id: Uuid,
        product_id: Uuid,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        quantity: i64,
        movement_type: MovementType,
        reason: Option<String>,
        status: MovementStatus,
        initiated_by: Uuid,
        initiated_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        cancelled_at: Option<DateTime<Utc>>,
        cancellation_reason: Option<String>,
        version: i64,
    ) -> Self {
        Self {
            movement_id,
            tenant_id,
            stock_item_id,
            product_id,
            source_location_id,
            destination_location_id,
            quantity,
            movement_type,
            reason,
            status,
            initiated_by,
            initiated_at,
            completed_at,
            cancelled_at,
            cancellation_reason,
            version,
            events: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, MovementStatus::Completed | MovementStatus::Cancelled)
    }

    /// Mark the movement completed. Terminal states reject further changes.
    pub fn complete(&mut self) -> Result<()> {
        if self.status != MovementStatus::Initiated {
            return Err(AppError::ValidationError(format!(
                "Movement {} cannot be completed from {:?}",
                self.movement_id, self.status
            )));
        }
        self.status = MovementStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.record(DomainEvent::StockMovementCompleted(StockMovementCompletedEvent {
            movement_id: self.movement_id,
            tenant_id: self.tenant_id,
            stock_item_id: self.stock_item_id,
            source_location_id: self.source_location_id,
            destination_location_id: self.destination_location_id,
            quantity: self.quantity,
            version: self.version,
        }));
        Ok(())
    }

    /// Cancel the movement with a non-empty reason
    pub fn cancel(&mut self, reason: &str) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Cancelling a movement requires a reason".to_string(),
            ));
        }
        if self.status != MovementStatus::Initiated {
            return Err(AppError::ValidationError(format!(
                "Movement {} cannot be cancelled from {:?}",
                self.movement_id, self.status
            )));
        }
        self.status = MovementStatus::Cancelled;
        self.cancelled_at = Some(Utc::now());
        self.cancellation_reason = Some(reason.trim().to_string());
        self.record(DomainEvent::StockMovementCancelled(StockMovementCancelledEvent {
            movement_id: self.movement_id,
            tenant_id: self.tenant_id,
            reason: reason.trim().to_string(),
            version: self.version,
        }));
        Ok(())
    }

    /// Drain the collected events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement() -> StockMovement {
        let mut movement = StockMovement::initiate(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            4,
            MovementType::Transfer,
            None,
            Uuid::new_v4(),
        )
        .unwrap();
        movement.take_events();
        movement
    }

    #[test]
    fn initiate_rejects_same_source_and_destination() {
        let location_id = Uuid::new_v4();
        let result = StockMovement::initiate(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            location_id,
            location_id,
            4,
            MovementType::Transfer,
            None,
            Uuid::new_v4(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn initiate_rejects_non_positive_quantity() {
        let result = StockMovement::initiate(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            MovementType::Transfer,
            None,
            Uuid::new_v4(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn initiate_emits_event() {
        let mut movement = StockMovement::initiate(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            4,
            MovementType::Putaway,
            Some("receiving".to_string()),
            Uuid::new_v4(),
        )
        .unwrap();
        let events = movement.take_events();
        assert!(matches!(events.as_slice(), [DomainEvent::StockMovementInitiated(_)]));
    }

    #[test]
    fn complete_is_terminal() {
        let mut movement = movement();
        movement.complete().unwrap();
        assert_eq!(movement.status, MovementStatus::Completed);
        assert!(movement.completed_at.is_some());
        assert!(movement.complete().is_err());
        assert!(movement.cancel("late cancel").is_err());
    }

    #[test]
    fn cancel_requires_reason_and_is_terminal() {
        let mut movement = movement();
        assert!(movement.cancel("").is_err());
        movement.cancel("wrong destination scanned").unwrap();
        assert_eq!(movement.status, MovementStatus::Cancelled);
        assert!(movement.cancelled_at.is_some());
        assert!(movement.complete().is_err());
    }
}
