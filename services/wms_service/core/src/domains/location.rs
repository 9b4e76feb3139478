//! Location aggregate
//!
//! A tree of warehouse -> zone -> aisle -> rack -> bin locations with strict
//! status transitions, capacity accounting, and cycle-safe path generation.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use shared_error::AppError;

use super::events::{
    DomainEvent, LocationAssignedEvent, LocationCreatedEvent, LocationReleasedEvent,
    LocationStatusChangedEvent,
};
use crate::Result;

/// Barcodes are 8-20 uppercase alphanumeric characters
static BARCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{8,20}$").unwrap());

/// Level of a location in the physical hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum LocationType {
    Warehouse,
    Zone,
    Aisle,
    Rack,
    Bin,
}

impl LocationType {
    fn barcode_prefix(self) -> &'static str {
        match self {
            LocationType::Warehouse => "WH",
            LocationType::Zone => "ZN",
            LocationType::Aisle => "AI",
            LocationType::Rack => "RK",
            LocationType::Bin => "BN",
        }
    }
}

/// Location status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum LocationStatus {
    Available,
    Occupied,
    Reserved,
    Blocked,
}

/// Physical coordinates within the warehouse
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Coordinates {
    pub zone: Option<String>,
    pub aisle: Option<String>,
    pub rack: Option<String>,
    pub level: Option<String>,
}

/// Capacity accounting: `current <= maximum` whenever maximum is set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Capacity {
    pub current: i64,
    pub maximum: Option<i64>,
}

impl Capacity {
    pub fn empty(maximum: Option<i64>) -> Self {
        Self { current: 0, maximum }
    }

    pub fn remaining(&self) -> i64 {
        self.maximum.map(|m| (m - self.current).max(0)).unwrap_or(i64::MAX)
    }
}

/// Location aggregate root
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub location_id: Uuid,
    pub tenant_id: Uuid,
    pub parent_location_id: Option<Uuid>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub barcode: String,
    pub location_type: LocationType,
    pub coordinates: Option<Coordinates>,
    pub status: LocationStatus,
    pub capacity: Capacity,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub version: i64,

    /// Append-only buffer drained by the command handler
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// Validate an externally supplied barcode
pub fn validate_barcode(barcode: &str) -> Result<()> {
    if BARCODE_RE.is_match(barcode) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Barcode '{}' must be 8-20 uppercase alphanumeric characters",
            barcode
        )))
    }
}

/// Generate a barcode for a location without one
pub fn generate_barcode(location_type: LocationType) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string()[..12].to_uppercase();
    format!("{}{}", location_type.barcode_prefix(), suffix)
}

impl Location {
    /// Create a new location in AVAILABLE state, emitting `LocationCreated`.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        tenant_id: Uuid,
        parent_location_id: Option<Uuid>,
        code: Option<String>,
        name: Option<String>,
        barcode: Option<String>,
        location_type: LocationType,
        coordinates: Option<Coordinates>,
        maximum_capacity: Option<i64>,
        description: Option<String>,
    ) -> Result<Self> {
        let barcode = match barcode {
            Some(b) => {
                validate_barcode(&b)?;
                b
            },
            None => generate_barcode(location_type),
        };

        if location_type == LocationType::Warehouse {
            if parent_location_id.is_some() {
                return Err(AppError::ValidationError(
                    "A warehouse location cannot have a parent".to_string(),
                ));
            }
            if code.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(AppError::ValidationError(
                    "A warehouse location requires a code".to_string(),
                ));
            }
        }

        if let Some(max) = maximum_capacity {
            if max < 0 {
                return Err(AppError::ValidationError(
                    "Maximum capacity cannot be negative".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let mut location = Self {
            location_id: Uuid::now_v7(),
            tenant_id,
            parent_location_id,
            code,
            name,
            barcode,
            location_type,
            coordinates,
            status: LocationStatus::Available,
            capacity: Capacity::empty(maximum_capacity),
            description,
            created_at: now,
            last_modified_at: now,
            version: 1,
            events: Vec::new(),
        };

        location.record(DomainEvent::LocationCreated(LocationCreatedEvent {
            location_id: location.location_id,
            tenant_id: location.tenant_id,
            barcode: location.barcode.clone(),
            code: location.code.clone(),
            location_type: location.location_type,
            parent_location_id: location.parent_location_id,
            version: location.version,
        }));

        Ok(location)
    }

    /// Rebuild the aggregate from stored state. Never emits events.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        location_id: Uuid,
        tenant_id: Uuid,
        parent_location_id: Option<Uuid>,
        code: Option<String>,
        name: Option<String>,
        barcode: String,
        location_type: LocationType,
        coordinates: Option<Coordinates>,
        status: LocationStatus,
        capacity: Capacity,
        description: Option<String>,
        created_at: DateTime<Utc>,
        last_modified_at: DateTime<Utc>,
        version: i64,
    ) -> Self {
        Self {
            location_id,
            tenant_id,
            parent_location_id,
            code,
            name,
            barcode,
            location_type,
            coordinates,
            status,
            capacity,
            description,
            created_at,
            last_modified_at,
            version,
            events: Vec::new(),
        }
    }

    /// True iff `qty` additional units fit
    pub fn can_accommodate(&self, qty: i64) -> bool {
        if qty <= 0 {
            return false;
        }
        match self.capacity.maximum {
            Some(max) => self.capacity.current + qty <= max,
            None => true,
        }
    }

    pub fn remaining_capacity(&self) -> i64 {
        self.capacity.remaining()
    }

    /// Display segment used in hierarchy paths
    pub fn path_segment(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.barcode)
    }

    /// Generic status update entry point for the `UpdateLocationStatus`
    /// command. OCCUPIED is never a free transition; it is only reached
    /// through `assign_stock`.
    pub fn update_status(&mut self, new: LocationStatus, reason: Option<&str>) -> Result<()> {
        match new {
            LocationStatus::Available => match self.status {
                LocationStatus::Reserved => self.release(),
                LocationStatus::Blocked => self.unblock(),
                LocationStatus::Available => Ok(()),
                LocationStatus::Occupied => Err(self.invalid_transition(new)),
            },
            LocationStatus::Reserved => self.reserve(),
            LocationStatus::Blocked => {
                let reason = reason.map(str::trim).unwrap_or("");
                if reason.is_empty() {
                    return Err(AppError::ValidationError(
                        "Blocking a location requires a reason".to_string(),
                    ));
                }
                self.block(reason)
            },
            LocationStatus::Occupied => Err(AppError::ValidationError(
                "OCCUPIED is reached by assigning stock, not by a status update".to_string(),
            )),
        }
    }

    /// Block the location. Allowed from any non-blocked state; requires a
    /// non-empty reason.
    pub fn block(&mut self, reason: &str) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Blocking a location requires a reason".to_string(),
            ));
        }
        if self.status == LocationStatus::Blocked {
            return Err(self.invalid_transition(LocationStatus::Blocked));
        }
        self.transition(LocationStatus::Blocked, Some(reason.trim().to_string()));
        Ok(())
    }

    /// Return a BLOCKED location to AVAILABLE
    pub fn unblock(&mut self) -> Result<()> {
        if self.status != LocationStatus::Blocked {
            return Err(self.invalid_transition(LocationStatus::Available));
        }
        self.transition(LocationStatus::Available, None);
        Ok(())
    }

    /// Reserve an AVAILABLE location
    pub fn reserve(&mut self) -> Result<()> {
        if self.status != LocationStatus::Available {
            return Err(self.invalid_transition(LocationStatus::Reserved));
        }
        self.transition(LocationStatus::Reserved, None);
        Ok(())
    }

    /// Release a RESERVED location back to AVAILABLE
    pub fn release(&mut self) -> Result<()> {
        if self.status != LocationStatus::Reserved {
            return Err(self.invalid_transition(LocationStatus::Available));
        }
        self.transition(LocationStatus::Available, None);
        Ok(())
    }

    /// Assign stock into this location, raising current capacity.
    ///
    /// Raising `capacity.current` above zero is what moves the location to
    /// OCCUPIED; a BLOCKED location never accepts stock.
    pub fn assign_stock(&mut self, stock_item_id: Uuid, qty: i64) -> Result<()> {
        if qty <= 0 {
            return Err(AppError::ValidationError(
                "Assigned quantity must be positive".to_string(),
            ));
        }
        if self.status == LocationStatus::Blocked {
            return Err(AppError::ValidationError(
                "Cannot assign stock to a blocked location".to_string(),
            ));
        }
        if !self.can_accommodate(qty) {
            return Err(AppError::InvariantViolation(format!(
                "Location {} cannot accommodate {} units (current {}, maximum {:?})",
                self.barcode, qty, self.capacity.current, self.capacity.maximum
            )));
        }

        self.capacity.current += qty;
        if self.status != LocationStatus::Occupied {
            self.transition(LocationStatus::Occupied, None);
        } else {
            self.touch();
        }
        self.record(DomainEvent::LocationAssigned(LocationAssignedEvent {
            location_id: self.location_id,
            tenant_id: self.tenant_id,
            stock_item_id,
            quantity: qty,
            version: self.version,
        }));
        Ok(())
    }

    /// Release stock out of this location, lowering current capacity.
    ///
    /// Releasing the last unit returns the location to AVAILABLE unless it
    /// has been blocked in the meantime; BLOCKED is sticky until an explicit
    /// `unblock`.
    pub fn release_stock(&mut self, stock_item_id: Uuid, qty: i64) -> Result<()> {
        if qty <= 0 {
            return Err(AppError::ValidationError(
                "Released quantity must be positive".to_string(),
            ));
        }
        if qty > self.capacity.current {
            return Err(AppError::InvariantViolation(format!(
                "Cannot release {} units from location {} holding {}",
                qty, self.barcode, self.capacity.current
            )));
        }

        self.capacity.current -= qty;
        if self.capacity.current == 0 && self.status == LocationStatus::Occupied {
            self.transition(LocationStatus::Available, None);
        } else {
            self.touch();
        }
        self.record(DomainEvent::LocationReleased(LocationReleasedEvent {
            location_id: self.location_id,
            tenant_id: self.tenant_id,
            stock_item_id,
            quantity: qty,
            version: self.version,
        }));
        Ok(())
    }

    /// Drain the collected events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn transition(&mut self, new: LocationStatus, reason: Option<String>) {
        let old = self.status;
        self.status = new;
        self.touch();
        self.record(DomainEvent::LocationStatusChanged(LocationStatusChangedEvent {
            location_id: self.location_id,
            tenant_id: self.tenant_id,
            old_status: old,
            new_status: new,
            reason,
            version: self.version,
        }));
    }

    fn invalid_transition(&self, target: LocationStatus) -> AppError {
        AppError::ValidationError(format!(
            "Invalid status transition {:?} -> {:?} for location {}",
            self.status, target, self.barcode
        ))
    }

    fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }
}

/// Minimal view of a location used for path and hierarchy walks
#[derive(Debug, Clone)]
pub struct PathNode {
    pub location_id: Uuid,
    pub parent_location_id: Option<Uuid>,
    pub segment: String,
    pub location_type: LocationType,
}

impl From<&Location> for PathNode {
    fn from(location: &Location) -> Self {
        Self {
            location_id: location.location_id,
            parent_location_id: location.parent_location_id,
            segment: location.path_segment().to_string(),
            location_type: location.location_type,
        }
    }
}

/// Build the hierarchy path for a location by walking parents upward.
///
/// Roots (no parent, or type WAREHOUSE) yield `/{segment}`; children append
/// their segment to the parent path. A cycle in the parent chain aborts the
/// walk and yields an empty string with a warning.
pub fn build_location_path(location_id: Uuid, nodes: &HashMap<Uuid, PathNode>) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut cursor = Some(location_id);

    while let Some(id) = cursor {
        if !visited.insert(id) {
            tracing::warn!(location_id = %location_id, "Cycle detected in location hierarchy");
            return String::new();
        }
        let Some(node) = nodes.get(&id) else {
            // Dangling parent reference; treat the known chain as complete
            break;
        };
        segments.push(&node.segment);
        cursor = if node.location_type == LocationType::Warehouse {
            None
        } else {
            node.parent_location_id
        };
    }

    segments.reverse();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(max: Option<i64>) -> Location {
        let mut location = Location::create(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            Some("B1".to_string()),
            None,
            None,
            LocationType::Bin,
            None,
            max,
            None,
        )
        .unwrap();
        location.take_events();
        location
    }

    #[test]
    fn creation_starts_available_and_emits_created() {
        let mut location = Location::create(
            Uuid::new_v4(),
            None,
            Some("WH1".to_string()),
            Some("Main".to_string()),
            None,
            LocationType::Warehouse,
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(location.status, LocationStatus::Available);
        let events = location.take_events();
        assert!(matches!(events.as_slice(), [DomainEvent::LocationCreated(_)]));
    }

    #[test]
    fn warehouse_requires_code_and_no_parent() {
        let missing_code = Location::create(
            Uuid::new_v4(),
            None,
            None,
            None,
            None,
            LocationType::Warehouse,
            None,
            None,
            None,
        );
        assert!(missing_code.is_err());

        let with_parent = Location::create(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            Some("WH1".to_string()),
            None,
            None,
            LocationType::Warehouse,
            None,
            None,
            None,
        );
        assert!(with_parent.is_err());
    }

    #[test]
    fn provided_barcodes_are_validated() {
        for bad in ["short", "lowercase12", "WITH-DASH-12", "A1234567890123456789X"] {
            assert!(validate_barcode(bad).is_err(), "accepted {:?}", bad);
        }
        assert!(validate_barcode("RACK0001A").is_ok());
    }

    #[test]
    fn generated_barcodes_validate() {
        for location_type in [
            LocationType::Warehouse,
            LocationType::Zone,
            LocationType::Aisle,
            LocationType::Rack,
            LocationType::Bin,
        ] {
            let barcode = generate_barcode(location_type);
            assert!(validate_barcode(&barcode).is_ok(), "generated {:?}", barcode);
        }
    }

    #[test]
    fn assign_stock_moves_available_to_occupied() {
        let mut location = bin(Some(10));
        location.assign_stock(Uuid::new_v4(), 4).unwrap();
        assert_eq!(location.status, LocationStatus::Occupied);
        assert_eq!(location.capacity.current, 4);
        let events = location.take_events();
        assert_eq!(events.len(), 2); // status change + assigned
        assert!(events.iter().any(|e| matches!(e, DomainEvent::LocationAssigned(_))));
    }

    #[test]
    fn assign_stock_respects_capacity() {
        let mut location = bin(Some(5));
        location.assign_stock(Uuid::new_v4(), 5).unwrap();
        let err = location.assign_stock(Uuid::new_v4(), 1).unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
        assert_eq!(location.capacity.current, 5);
    }

    #[test]
    fn full_release_returns_to_available() {
        let mut location = bin(Some(10));
        let item = Uuid::new_v4();
        location.assign_stock(item, 6).unwrap();
        location.release_stock(item, 2).unwrap();
        assert_eq!(location.status, LocationStatus::Occupied);
        location.release_stock(item, 4).unwrap();
        assert_eq!(location.status, LocationStatus::Available);
        assert_eq!(location.capacity.current, 0);
    }

    #[test]
    fn release_cannot_underflow() {
        let mut location = bin(Some(10));
        location.assign_stock(Uuid::new_v4(), 2).unwrap();
        assert!(location.release_stock(Uuid::new_v4(), 3).is_err());
    }

    #[test]
    fn block_requires_reason_and_is_sticky() {
        let mut location = bin(Some(10));
        assert!(location.block("  ").is_err());
        location.block("damaged racking").unwrap();
        assert_eq!(location.status, LocationStatus::Blocked);
        // Blocked locations accept no stock and no reserve
        assert!(location.assign_stock(Uuid::new_v4(), 1).is_err());
        assert!(location.reserve().is_err());
        location.unblock().unwrap();
        assert_eq!(location.status, LocationStatus::Available);
    }

    #[test]
    fn reserved_accepts_assignment() {
        let mut location = bin(Some(10));
        location.reserve().unwrap();
        location.assign_stock(Uuid::new_v4(), 1).unwrap();
        assert_eq!(location.status, LocationStatus::Occupied);
    }

    #[test]
    fn update_status_rejects_occupied_target() {
        let mut location = bin(Some(10));
        assert!(location.update_status(LocationStatus::Occupied, None).is_err());
    }

    #[test]
    fn update_status_requires_reason_for_block() {
        let mut location = bin(Some(10));
        assert!(location.update_status(LocationStatus::Blocked, None).is_err());
        assert!(location
            .update_status(LocationStatus::Blocked, Some("audit hold"))
            .is_ok());
    }

    #[test]
    fn occupied_to_reserved_is_rejected() {
        let mut location = bin(Some(10));
        location.assign_stock(Uuid::new_v4(), 1).unwrap();
        assert!(location.reserve().is_err());
    }

    fn node(
        id: Uuid,
        parent: Option<Uuid>,
        segment: &str,
        location_type: LocationType,
    ) -> (Uuid, PathNode) {
        (
            id,
            PathNode {
                location_id: id,
                parent_location_id: parent,
                segment: segment.to_string(),
                location_type,
            },
        )
    }

    #[test]
    fn path_is_prefix_closed() {
        let wh = Uuid::new_v4();
        let zone = Uuid::new_v4();
        let bin_id = Uuid::new_v4();
        let nodes: HashMap<_, _> = [
            node(wh, None, "WH1", LocationType::Warehouse),
            node(zone, Some(wh), "Z1", LocationType::Zone),
            node(bin_id, Some(zone), "B1", LocationType::Bin),
        ]
        .into_iter()
        .collect();

        assert_eq!(build_location_path(wh, &nodes), "/WH1");
        assert_eq!(build_location_path(zone, &nodes), "/WH1/Z1");
        assert_eq!(build_location_path(bin_id, &nodes), "/WH1/Z1/B1");
    }

    #[test]
    fn cyclic_hierarchy_yields_empty_path() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let nodes: HashMap<_, _> = [
            node(a, Some(b), "A", LocationType::Zone),
            node(b, Some(a), "B", LocationType::Zone),
        ]
        .into_iter()
        .collect();

        assert_eq!(build_location_path(a, &nodes), "");
    }

    #[test]
    fn warehouse_parent_terminates_walk() {
        let wh = Uuid::new_v4();
        let nodes: HashMap<_, _> =
            [node(wh, Some(Uuid::new_v4()), "WH9", LocationType::Warehouse)]
                .into_iter()
                .collect();
        // A warehouse is a root even if a parent id is somehow present
        assert_eq!(build_location_path(wh, &nodes), "/WH9");
    }
}
