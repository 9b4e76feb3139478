//! Restock request aggregate and stock level thresholds
//!
//! Requests are generated from `StockLevelBelowMinimum` events. At most one
//! active request exists per (tenant, product, location); duplicates update
//! the existing request in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_error::AppError;

use super::events::{DomainEvent, RestockRequestGeneratedEvent};
use crate::Result;

/// Restock urgency derived from how far below minimum the level has fallen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RestockPriority {
    Low,
    Medium,
    High,
}

/// Restock request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RestockStatus {
    Pending,
    SentToD365,
    Fulfilled,
    Cancelled,
}

/// Derive the priority from current vs minimum quantity
pub fn derive_priority(current: i64, minimum: i64) -> RestockPriority {
    if minimum <= 0 {
        return RestockPriority::Low;
    }
    let ratio = current as f64 / minimum as f64;
    if ratio < 0.5 {
        RestockPriority::High
    } else if ratio < 1.0 {
        RestockPriority::Medium
    } else {
        RestockPriority::Low
    }
}

/// Derive the quantity to request: top up to maximum when set, else to twice
/// the minimum
pub fn derive_requested_quantity(current: i64, minimum: i64, maximum: Option<i64>) -> i64 {
    match maximum {
        Some(max) => (max - current).max(0),
        None => (2 * minimum - current).max(0),
    }
}

/// Restock request aggregate root
#[derive(Debug, Clone, Serialize)]
pub struct RestockRequest {
    pub restock_request_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub current_quantity: i64,
    pub minimum_quantity: i64,
    pub maximum_quantity: Option<i64>,
    pub requested_quantity: i64,
    pub priority: RestockPriority,
    pub status: RestockStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub order_reference: Option<String>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,

    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl RestockRequest {
    /// Generate a new PENDING request from observed stock levels
    pub fn generate(
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
        current_quantity: i64,
        minimum_quantity: i64,
        maximum_quantity: Option<i64>,
    ) -> Result<Self> {
        if minimum_quantity < 0 {
            return Err(AppError::ValidationError(
                "Minimum quantity cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let priority = derive_priority(current_quantity, minimum_quantity);
        let requested_quantity =
            derive_requested_quantity(current_quantity, minimum_quantity, maximum_quantity);

        let mut request = Self {
            restock_request_id: Uuid::now_v7(),
            tenant_id,
            product_id,
            location_id,
            current_quantity,
            minimum_quantity,
            maximum_quantity,
            requested_quantity,
            priority,
            status: RestockStatus::Pending,
            created_at: now,
            sent_at: None,
            order_reference: None,
            last_modified_at: now,
            version: 1,
            events: Vec::new(),
        };

        request.record(DomainEvent::RestockRequestGenerated(RestockRequestGeneratedEvent {
            restock_request_id: request.restock_request_id,
            tenant_id: request.tenant_id,
            product_id: request.product_id,
            location_id: request.location_id,
            requested_quantity: request.requested_quantity,
            priority: request.priority,
            version: request.version,
        }));
        Ok(request)
    }

    /// Rebuild from stored state. Never emits events.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        restock_request_id: Uuid,
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
        current_quantity: i64,
        minimum_quantity: i64,
        maximum_quantity: Option<i64>,
        requested_quantity: i64,
        priority: RestockPriority,
        status: RestockStatus,
        created_at: DateTime<Utc>,
        sent_at: Option<DateTime<Utc>>,
        order_reference: Option<String>,
        last_modified_at: DateTime<Utc>,
        version: i64,
    ) -> Self {
        Self {
            restock_request_id,
            tenant_id,
            product_id,
            location_id,
            current_quantity,
            minimum_quantity,
            maximum_quantity,
            requested_quantity,
            priority,
            status,
            created_at,
            sent_at,
            order_reference,
            last_modified_at,
            version,
            events: Vec::new(),
        }
    }

    /// PENDING and SENT_TO_D365 requests are active for dedup purposes
    pub fn is_active(&self) -> bool {
        matches!(self.status, RestockStatus::Pending | RestockStatus::SentToD365)
    }

    /// Update an existing active request when a duplicate below-minimum
    /// event arrives, instead of creating a second one
    pub fn refresh_levels(&mut self, current_quantity: i64) -> Result<()> {
        if !self.is_active() {
            return Err(AppError::ValidationError(
                "Only an active restock request can be refreshed".to_string(),
            ));
        }
        self.current_quantity = current_quantity;
        self.priority = derive_priority(current_quantity, self.minimum_quantity);
        self.requested_quantity = derive_requested_quantity(
            current_quantity,
            self.minimum_quantity,
            self.maximum_quantity,
        );
        self.touch();
        Ok(())
    }

    /// PENDING -> SENT_TO_D365, recording the external order reference
    pub fn mark_as_sent(&mut self, order_reference: &str) -> Result<()> {
        if self.status != RestockStatus::Pending {
            return Err(AppError::ValidationError(format!(
                "Restock request {} cannot be sent from {:?}",
                self.restock_request_id, self.status
            )));
        }
        if order_reference.trim().is_empty() {
            return Err(AppError::ValidationError(
                "An order reference is required".to_string(),
            ));
        }
        self.status = RestockStatus::SentToD365;
        self.sent_at = Some(Utc::now());
        self.order_reference = Some(order_reference.trim().to_string());
        self.touch();
        Ok(())
    }

    /// SENT_TO_D365 -> FULFILLED. Idempotent: marking an already fulfilled
    /// request succeeds without change. A cancelled request cannot become
    /// fulfilled.
    pub fn mark_as_fulfilled(&mut self) -> Result<()> {
        match self.status {
            RestockStatus::Fulfilled => Ok(()),
            RestockStatus::SentToD365 => {
                self.status = RestockStatus::Fulfilled;
                self.touch();
                Ok(())
            },
            RestockStatus::Cancelled => Err(AppError::ValidationError(
                "A cancelled restock request cannot be fulfilled".to_string(),
            )),
            RestockStatus::Pending => Err(AppError::ValidationError(
                "A restock request must be sent before it can be fulfilled".to_string(),
            )),
        }
    }

    /// Any non-FULFILLED request can be cancelled; cancelling twice is a
    /// no-op
    pub fn cancel(&mut self) -> Result<()> {
        match self.status {
            RestockStatus::Fulfilled => Err(AppError::ValidationError(
                "A fulfilled restock request cannot be cancelled".to_string(),
            )),
            RestockStatus::Cancelled => Ok(()),
            _ => {
                self.status = RestockStatus::Cancelled;
                self.touch();
                Ok(())
            },
        }
    }

    /// Drain the collected events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }
}

/// Per-product stock level threshold driving restock generation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockLevelThreshold {
    pub threshold_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub location_id: Option<Uuid>,
    pub minimum: i64,
    pub maximum: Option<i64>,
    pub enable_auto_restock: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,
}

impl StockLevelThreshold {
    pub fn new(
        tenant_id: Uuid,
        product_id: Uuid,
        location_id: Option<Uuid>,
        minimum: i64,
        maximum: Option<i64>,
        enable_auto_restock: bool,
    ) -> Result<Self> {
        if minimum < 0 {
            return Err(AppError::ValidationError(
                "Threshold minimum cannot be negative".to_string(),
            ));
        }
        if let Some(max) = maximum {
            if minimum >= max {
                return Err(AppError::ValidationError(format!(
                    "Threshold minimum {} must be below maximum {}",
                    minimum, max
                )));
            }
        }
        let now = Utc::now();
        Ok(Self {
            threshold_id: Uuid::now_v7(),
            tenant_id,
            product_id,
            location_id,
            minimum,
            maximum,
            enable_auto_restock,
            created_at: now,
            last_modified_at: now,
            version: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_derivation_boundaries() {
        assert_eq!(derive_priority(4, 10), RestockPriority::High);
        assert_eq!(derive_priority(5, 10), RestockPriority::Medium);
        assert_eq!(derive_priority(9, 10), RestockPriority::Medium);
        assert_eq!(derive_priority(10, 10), RestockPriority::Low);
        assert_eq!(derive_priority(15, 10), RestockPriority::Low);
        assert_eq!(derive_priority(0, 0), RestockPriority::Low);
    }

    #[test]
    fn requested_quantity_tops_up_to_maximum() {
        assert_eq!(derive_requested_quantity(3, 10, Some(50)), 47);
        assert_eq!(derive_requested_quantity(60, 10, Some(50)), 0);
        assert_eq!(derive_requested_quantity(3, 10, None), 17);
        assert_eq!(derive_requested_quantity(25, 10, None), 0);
    }

    fn request() -> RestockRequest {
        let mut request =
            RestockRequest::generate(Uuid::new_v4(), Uuid::new_v4(), None, 3, 10, Some(50))
                .unwrap();
        request.take_events();
        request
    }

    #[test]
    fn generate_derives_priority_and_quantity() {
        let mut request =
            RestockRequest::generate(Uuid::new_v4(), Uuid::new_v4(), None, 3, 10, Some(50))
                .unwrap();
        assert_eq!(request.priority, RestockPriority::High);
        assert_eq!(request.requested_quantity, 47);
        assert_eq!(request.status, RestockStatus::Pending);
        let events = request.take_events();
        assert!(matches!(events.as_slice(), [DomainEvent::RestockRequestGenerated(_)]));
    }

    #[test]
    fn lifecycle_pending_sent_fulfilled() {
        let mut request = request();
        assert!(request.mark_as_fulfilled().is_err());
        request.mark_as_sent("D365-0042").unwrap();
        assert_eq!(request.status, RestockStatus::SentToD365);
        assert!(request.sent_at.is_some());
        request.mark_as_fulfilled().unwrap();
        // idempotent
        request.mark_as_fulfilled().unwrap();
        assert_eq!(request.status, RestockStatus::Fulfilled);
    }

    #[test]
    fn fulfilled_cannot_be_cancelled() {
        let mut request = request();
        request.mark_as_sent("D365-0042").unwrap();
        request.mark_as_fulfilled().unwrap();
        assert!(request.cancel().is_err());
    }

    #[test]
    fn cancelled_cannot_be_fulfilled() {
        let mut request = request();
        request.cancel().unwrap();
        assert!(request.mark_as_fulfilled().is_err());
        // cancelling again is a no-op
        request.cancel().unwrap();
        assert_eq!(request.status, RestockStatus::Cancelled);
    }

    #[test]
    fn refresh_recomputes_priority_and_quantity() {
        let mut request = request();
        request.refresh_levels(8).unwrap();
        assert_eq!(request.priority, RestockPriority::Medium);
        assert_eq!(request.requested_quantity, 42);

        request.cancel().unwrap();
        assert!(request.refresh_levels(1).is_err());
    }

    #[test]
    fn threshold_requires_minimum_below_maximum() {
        assert!(StockLevelThreshold::new(Uuid::new_v4(), Uuid::new_v4(), None, 10, Some(10), true)
            .is_err());
        assert!(StockLevelThreshold::new(Uuid::new_v4(), Uuid::new_v4(), None, -1, None, true)
            .is_err());
        assert!(StockLevelThreshold::new(Uuid::new_v4(), Uuid::new_v4(), None, 10, Some(50), true)
            .is_ok());
        assert!(StockLevelThreshold::new(Uuid::new_v4(), Uuid::new_v4(), None, 10, None, false)
            .is_ok());
    }
}
