//! Stock item aggregate and date-driven classification
//!
//! Classification is a pure function of (expiration date, today). The
//! aggregate recomputes it on every expiration change and emits transition
//! events; rebuilding from storage recomputes silently.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_error::AppError;

use super::events::{
    DomainEvent, LocationAssignedToStockItemEvent, StockAdjustedEvent, StockAllocatedEvent,
    StockAllocationReleasedEvent, StockClassifiedEvent, StockExpiredEvent,
    StockExpiringAlertEvent,
};
use crate::Result;

/// Days-to-expiry window treated as CRITICAL
pub const CRITICAL_THRESHOLD_DAYS: i64 = 7;
/// Days-to-expiry window treated as NEAR_EXPIRY
pub const NEAR_EXPIRY_THRESHOLD_DAYS: i64 = 30;
/// Items further out than this are EXTENDED_SHELF_LIFE
pub const EXTENDED_SHELF_LIFE_DAYS: i64 = 365;

/// Expiration proximity label derived from the expiration date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum StockClassification {
    Expired,
    Critical,
    NearExpiry,
    Normal,
    ExtendedShelfLife,
}

/// Classify a stock item by its expiration date.
///
/// Pure and deterministic given `today`; running it twice in the same day on
/// the same input yields the same label.
pub fn classify(expiration_date: Option<NaiveDate>, today: NaiveDate) -> StockClassification {
    let Some(expiration) = expiration_date else {
        return StockClassification::Normal;
    };
    let days = (expiration - today).num_days();
    if days < 0 {
        StockClassification::Expired
    } else if days <= CRITICAL_THRESHOLD_DAYS {
        StockClassification::Critical
    } else if days <= NEAR_EXPIRY_THRESHOLD_DAYS {
        StockClassification::NearExpiry
    } else if days > EXTENDED_SHELF_LIFE_DAYS {
        StockClassification::ExtendedShelfLife
    } else {
        StockClassification::Normal
    }
}

/// Stock item aggregate root
#[derive(Debug, Clone, Serialize)]
pub struct StockItem {
    pub stock_item_id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub consignment_id: Uuid,
    pub location_id: Option<Uuid>,
    pub quantity: i64,
    pub allocated_quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    pub classification: StockClassification,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,

    /// Append-only buffer drained by the command handler
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl StockItem {
    /// Create a new stock item; classification is computed immediately and
    /// the null -> initial transition emits `StockClassified`.
    pub fn create(
        tenant_id: Uuid,
        product_id: Uuid,
        consignment_id: Uuid,
        quantity: i64,
        expiration_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        if quantity < 0 {
            return Err(AppError::ValidationError(
                "Stock quantity cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let mut item = Self {
            stock_item_id: Uuid::now_v7(),
            tenant_id,
            product_id,
            consignment_id,
            location_id: None,
            quantity,
            allocated_quantity: 0,
            expiration_date,
            // placeholder, set by the transition below
            classification: StockClassification::Normal,
            created_at: now,
            last_modified_at: now,
            version: 1,
            events: Vec::new(),
        };
        item.apply_classification(None, classify(expiration_date, today), today);
        Ok(item)
    }

    /// Rebuild from stored state, recomputing classification against `today`
    /// without emitting any events.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        stock_item_id: Uuid,
        tenant_id: Uuid,
        product_id: Uuid,
        consignment_id: Uuid,
        location_id: Option<Uuid>,
        quantity: i64,
        allocated_quantity: i64,
        expiration_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
        last_modified_at: DateTime<Utc>,
        version: i64,
        today: NaiveDate,
    ) -> Self {
        Self {
            stock_item_id,
            tenant_id,
            product_id,
            consignment_id,
            location_id,
            quantity,
            allocated_quantity,
            expiration_date,
            classification: classify(expiration_date, today),
            created_at,
            last_modified_at,
            version,
            events: Vec::new(),
        }
    }

    pub fn available_quantity(&self) -> i64 {
        self.quantity - self.allocated_quantity
    }

    /// Pickable iff not expired and some quantity is unallocated
    pub fn can_be_picked(&self) -> bool {
        self.classification != StockClassification::Expired && self.available_quantity() > 0
    }

    /// Change the expiration date and reclassify
    pub fn update_expiration_date(
        &mut self,
        expiration_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<()> {
        self.expiration_date = expiration_date;
        self.touch();
        self.reclassify(today);
        Ok(())
    }

    /// Recompute classification and emit transition events when it changed
    pub fn reclassify(&mut self, today: NaiveDate) {
        let new = classify(self.expiration_date, today);
        if new != self.classification {
            let old = self.classification;
            self.apply_classification(Some(old), new, today);
        }
    }

    /// Assign this item to a BIN location
    pub fn assign_location(&mut self, location_id: Uuid, qty: i64) -> Result<()> {
        if self.classification == StockClassification::Expired {
            return Err(AppError::ValidationError(
                "Expired stock cannot be assigned to a location".to_string(),
            ));
        }
        if self.quantity == 0 {
            return Err(AppError::ValidationError(
                "Stock with zero quantity cannot be assigned".to_string(),
            ));
        }
        if qty <= 0 || qty > self.quantity {
            return Err(AppError::ValidationError(format!(
                "Assignment quantity {} must be within (0, {}]",
                qty, self.quantity
            )));
        }

        self.location_id = Some(location_id);
        self.touch();
        self.record(DomainEvent::LocationAssignedToStockItem(
            LocationAssignedToStockItemEvent {
                stock_item_id: self.stock_item_id,
                tenant_id: self.tenant_id,
                location_id,
                quantity: qty,
                expiration_date: self.expiration_date,
                classification: self.classification,
                version: self.version,
            },
        ));
        Ok(())
    }

    /// Move the item to another location as part of a completed movement.
    /// The movement aggregate owns the events for this effect; quantity is
    /// untouched.
    pub fn relocate(&mut self, location_id: Uuid) {
        self.location_id = Some(location_id);
        self.touch();
    }

    /// Set the allocated quantity, emitting an allocation event in the
    /// direction of the change
    pub fn update_allocated_quantity(&mut self, qty: i64) -> Result<()> {
        if qty < 0 || qty > self.quantity {
            return Err(AppError::InvariantViolation(format!(
                "Allocated quantity {} must be within [0, {}]",
                qty, self.quantity
            )));
        }
        let old = self.allocated_quantity;
        if qty == old {
            return Ok(());
        }
        self.allocated_quantity = qty;
        self.touch();
        if qty > old {
            self.record(DomainEvent::StockAllocated(StockAllocatedEvent {
                stock_item_id: self.stock_item_id,
                tenant_id: self.tenant_id,
                product_id: self.product_id,
                quantity: qty - old,
                allocated_quantity: qty,
                version: self.version,
            }));
        } else {
            self.record(DomainEvent::StockAllocationReleased(StockAllocationReleasedEvent {
                stock_item_id: self.stock_item_id,
                tenant_id: self.tenant_id,
                product_id: self.product_id,
                quantity: old - qty,
                allocated_quantity: qty,
                version: self.version,
            }));
        }
        Ok(())
    }

    pub fn increase_quantity(&mut self, qty: i64, reason: &str) -> Result<()> {
        if qty <= 0 {
            return Err(AppError::ValidationError(
                "Quantity increase must be positive".to_string(),
            ));
        }
        self.set_quantity(self.quantity + qty, reason)
    }

    pub fn decrease_quantity(&mut self, qty: i64, reason: &str) -> Result<()> {
        if qty <= 0 {
            return Err(AppError::ValidationError(
                "Quantity decrease must be positive".to_string(),
            ));
        }
        self.set_quantity(self.quantity - qty, reason)
    }

    /// Set the absolute quantity, emitting `StockAdjusted`
    pub fn update_quantity(&mut self, qty: i64, reason: &str) -> Result<()> {
        self.set_quantity(qty, reason)
    }

    fn set_quantity(&mut self, new_quantity: i64, reason: &str) -> Result<()> {
        if new_quantity < 0 {
            return Err(AppError::InvariantViolation(
                "Stock quantity cannot go negative".to_string(),
            ));
        }
        if new_quantity < self.allocated_quantity {
            return Err(AppError::InvariantViolation(format!(
                "Quantity {} cannot drop below allocated quantity {}",
                new_quantity, self.allocated_quantity
            )));
        }
        if new_quantity == self.quantity {
            return Ok(());
        }
        let old = self.quantity;
        self.quantity = new_quantity;
        self.touch();
        self.record(DomainEvent::StockAdjusted(StockAdjustedEvent {
            stock_item_id: self.stock_item_id,
            tenant_id: self.tenant_id,
            product_id: self.product_id,
            old_quantity: old,
            new_quantity,
            reason: reason.to_string(),
            version: self.version,
        }));
        Ok(())
    }

    /// Drain the collected events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn apply_classification(
        &mut self,
        old: Option<StockClassification>,
        new: StockClassification,
        today: NaiveDate,
    ) {
        self.classification = new;
        self.record(DomainEvent::StockClassified(StockClassifiedEvent {
            stock_item_id: self.stock_item_id,
            tenant_id: self.tenant_id,
            old_classification: old,
            new_classification: new,
            expiration_date: self.expiration_date,
            quantity: self.quantity,
            version: self.version,
        }));

        match new {
            StockClassification::Expired => {
                if let Some(expiration) = self.expiration_date {
                    self.record(DomainEvent::StockExpired(StockExpiredEvent {
                        stock_item_id: self.stock_item_id,
                        tenant_id: self.tenant_id,
                        product_id: self.product_id,
                        expiration_date: expiration,
                        quantity: self.quantity,
                        version: self.version,
                    }));
                }
            },
            StockClassification::Critical | StockClassification::NearExpiry => {
                if let Some(expiration) = self.expiration_date {
                    let threshold = if new == StockClassification::Critical {
                        CRITICAL_THRESHOLD_DAYS
                    } else {
                        NEAR_EXPIRY_THRESHOLD_DAYS
                    };
                    self.record(DomainEvent::StockExpiringAlert(StockExpiringAlertEvent {
                        stock_item_id: self.stock_item_id,
                        tenant_id: self.tenant_id,
                        product_id: self.product_id,
                        expiration_date: expiration,
                        days_until_expiry: (expiration - today).num_days(),
                        threshold_days: threshold,
                        quantity: self.quantity,
                        version: self.version,
                    }));
                }
            },
            _ => {},
        }
    }

    fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn item_with_expiry(days: i64) -> StockItem {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            10,
            Some(today() + Duration::days(days)),
            today(),
        )
        .unwrap();
        item.take_events();
        item
    }

    #[test]
    fn classification_thresholds() {
        let t = today();
        assert_eq!(classify(None, t), StockClassification::Normal);
        assert_eq!(classify(Some(t - Duration::days(1)), t), StockClassification::Expired);
        assert_eq!(classify(Some(t), t), StockClassification::Critical);
        assert_eq!(classify(Some(t + Duration::days(7)), t), StockClassification::Critical);
        assert_eq!(classify(Some(t + Duration::days(8)), t), StockClassification::NearExpiry);
        assert_eq!(classify(Some(t + Duration::days(30)), t), StockClassification::NearExpiry);
        assert_eq!(classify(Some(t + Duration::days(31)), t), StockClassification::Normal);
        assert_eq!(classify(Some(t + Duration::days(365)), t), StockClassification::Normal);
        assert_eq!(
            classify(Some(t + Duration::days(366)), t),
            StockClassification::ExtendedShelfLife
        );
    }

    #[test]
    fn classification_is_idempotent_within_a_day() {
        let t = today();
        for days in [-5, 0, 3, 15, 100, 400] {
            let date = Some(t + Duration::days(days));
            assert_eq!(classify(date, t), classify(date, t));
        }
    }

    #[test]
    fn creation_emits_initial_classification() {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            5,
            None,
            today(),
        )
        .unwrap();
        let events = item.take_events();
        match events.as_slice() {
            [DomainEvent::StockClassified(e)] => {
                assert_eq!(e.old_classification, None);
                assert_eq!(e.new_classification, StockClassification::Normal);
            },
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn expired_creation_emits_stock_expired() {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            5,
            Some(today() - Duration::days(1)),
            today(),
        )
        .unwrap();
        assert_eq!(item.classification, StockClassification::Expired);
        let events = item.take_events();
        assert!(events.iter().any(|e| matches!(e, DomainEvent::StockExpired(_))));
        assert!(!item.can_be_picked());
    }

    #[test]
    fn critical_creation_emits_alert_with_seven_day_threshold() {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            5,
            Some(today() + Duration::days(2)),
            today(),
        )
        .unwrap();
        assert_eq!(item.classification, StockClassification::Critical);
        let events = item.take_events();
        let alert = events
            .iter()
            .find_map(|e| match e {
                DomainEvent::StockExpiringAlert(a) => Some(a),
                _ => None,
            })
            .expect("expected an expiring alert");
        assert_eq!(alert.threshold_days, CRITICAL_THRESHOLD_DAYS);

        // an update that keeps the classification emits nothing further
        item.update_expiration_date(Some(today() + Duration::days(3)), today()).unwrap();
        assert!(item.take_events().is_empty());
    }

    #[test]
    fn near_expiry_alert_carries_thirty_day_threshold() {
        let mut item = item_with_expiry(100);
        item.update_expiration_date(Some(today() + Duration::days(20)), today()).unwrap();
        let events = item.take_events();
        let alert = events
            .iter()
            .find_map(|e| match e {
                DomainEvent::StockExpiringAlert(a) => Some(a),
                _ => None,
            })
            .expect("expected an expiring alert");
        assert_eq!(alert.threshold_days, NEAR_EXPIRY_THRESHOLD_DAYS);
        assert_eq!(alert.days_until_expiry, 20);
    }

    #[test]
    fn reclassify_emits_exactly_one_classified_event_per_transition() {
        let mut item = item_with_expiry(100);
        item.reclassify(today());
        assert!(item.take_events().is_empty());

        item.update_expiration_date(Some(today() - Duration::days(2)), today()).unwrap();
        let events = item.take_events();
        let classified: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, DomainEvent::StockClassified(_)))
            .collect();
        assert_eq!(classified.len(), 1);
    }

    #[test]
    fn reload_from_storage_is_silent() {
        let item = StockItem::from_storage(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            10,
            0,
            Some(today() - Duration::days(1)),
            Utc::now(),
            Utc::now(),
            3,
            today(),
        );
        assert_eq!(item.classification, StockClassification::Expired);
        assert!(item.events.is_empty());
    }

    #[test]
    fn allocation_bounds_are_enforced() {
        let mut item = item_with_expiry(100);
        assert!(item.update_allocated_quantity(-1).is_err());
        assert!(item.update_allocated_quantity(11).is_err());
        item.update_allocated_quantity(10).unwrap();
        assert_eq!(item.available_quantity(), 0);
        assert!(!item.can_be_picked());
    }

    #[test]
    fn allocation_events_follow_direction() {
        let mut item = item_with_expiry(100);
        item.update_allocated_quantity(4).unwrap();
        item.update_allocated_quantity(1).unwrap();
        let events = item.take_events();
        assert!(matches!(
            events.as_slice(),
            [DomainEvent::StockAllocated(_), DomainEvent::StockAllocationReleased(_)]
        ));
    }

    #[test]
    fn quantity_cannot_drop_below_allocation() {
        let mut item = item_with_expiry(100);
        item.update_allocated_quantity(6).unwrap();
        assert!(item.decrease_quantity(5, "shrinkage").is_err());
        item.update_allocated_quantity(0).unwrap();
        item.decrease_quantity(5, "shrinkage").unwrap();
        assert_eq!(item.quantity, 5);
    }

    #[test]
    fn quantity_changes_emit_stock_adjusted() {
        let mut item = item_with_expiry(100);
        item.increase_quantity(5, "cycle count").unwrap();
        let events = item.take_events();
        match events.as_slice() {
            [DomainEvent::StockAdjusted(e)] => {
                assert_eq!(e.old_quantity, 10);
                assert_eq!(e.new_quantity, 15);
            },
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn assign_location_rejects_expired_and_overdrawn() {
        let mut expired = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            5,
            Some(today() - Duration::days(1)),
            today(),
        )
        .unwrap();
        assert!(expired.assign_location(Uuid::new_v4(), 1).is_err());

        let mut item = item_with_expiry(100);
        assert!(item.assign_location(Uuid::new_v4(), 11).is_err());
        assert!(item.assign_location(Uuid::new_v4(), 0).is_err());
        item.assign_location(Uuid::new_v4(), 10).unwrap();
        assert!(item.location_id.is_some());
    }

    #[test]
    fn zero_quantity_stock_cannot_be_assigned() {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            None,
            today(),
        )
        .unwrap();
        assert!(item.assign_location(Uuid::new_v4(), 1).is_err());
    }
}
