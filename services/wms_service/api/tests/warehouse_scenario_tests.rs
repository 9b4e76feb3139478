//! End-to-end warehouse scenarios expressed against the domain layer

use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use wms_service_core::domains::events::DomainEvent;
use wms_service_core::domains::location::{
    build_location_path, Location, LocationType, PathNode,
};
use wms_service_core::services::fefo::{plan_assignments, BinCandidate, FefoAssignmentRequest};
use wms_service_core::{classify, LocationStatus, MovementType, StockClassification, StockItem,
    StockMovement};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn location(
    tenant_id: Uuid,
    code: &str,
    location_type: LocationType,
    parent: Option<Uuid>,
    max: Option<i64>,
) -> Location {
    let mut location = Location::create(
        tenant_id,
        parent,
        Some(code.to_string()),
        None,
        None,
        location_type,
        None,
        max,
        None,
    )
    .unwrap();
    location.take_events();
    location
}

#[test]
fn warehouse_zone_bin_chain_yields_its_path() {
    let tenant_id = Uuid::new_v4();
    let warehouse = location(tenant_id, "WH1", LocationType::Warehouse, None, None);
    let zone = location(
        tenant_id,
        "Z1",
        LocationType::Zone,
        Some(warehouse.location_id),
        None,
    );
    let bin = location(tenant_id, "B1", LocationType::Bin, Some(zone.location_id), Some(10));

    let nodes: HashMap<Uuid, PathNode> = [&warehouse, &zone, &bin]
        .into_iter()
        .map(|l| (l.location_id, PathNode::from(l)))
        .collect();

    assert_eq!(build_location_path(bin.location_id, &nodes), "/WH1/Z1/B1");
}

#[test]
fn fefo_assignment_fills_one_bin_and_marks_it_occupied() {
    let tenant_id = Uuid::new_v4();
    let mut bin = location(tenant_id, "B1", LocationType::Bin, Some(Uuid::new_v4()), Some(8));

    let mut s1 = StockItem::create(
        tenant_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        3,
        Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    )
    .unwrap();
    let mut s2 = StockItem::create(
        tenant_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        5,
        Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    )
    .unwrap();
    s1.take_events();
    s2.take_events();

    let requests = vec![
        FefoAssignmentRequest {
            stock_item_id: s1.stock_item_id,
            quantity: 3,
            expiration_date: s1.expiration_date,
            classification: s1.classification,
        },
        FefoAssignmentRequest {
            stock_item_id: s2.stock_item_id,
            quantity: 5,
            expiration_date: s2.expiration_date,
            classification: s2.classification,
        },
    ];
    let candidates = vec![BinCandidate::from(&bin)];
    let plan = plan_assignments(&requests, &candidates, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

    assert_eq!(plan.assignments.len(), 2);
    // earliest expiry planned first
    assert_eq!(plan.assignments[0].stock_item_id, s2.stock_item_id);

    // apply the plan the way the command service does
    for assignment in &plan.assignments {
        let item = if assignment.stock_item_id == s1.stock_item_id { &mut s1 } else { &mut s2 };
        item.assign_location(assignment.location_id, assignment.quantity).unwrap();
        bin.assign_stock(assignment.stock_item_id, assignment.quantity).unwrap();
    }

    assert_eq!(bin.capacity.current, 8);
    assert_eq!(bin.status, LocationStatus::Occupied);
    let assigned_events = bin
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, DomainEvent::LocationAssigned(_)))
        .count();
    assert_eq!(assigned_events, 2);
}

#[test]
fn fifteen_units_across_two_bins_leave_five_free() {
    let tenant_id = Uuid::new_v4();
    let bin_a = location(tenant_id, "B1", LocationType::Bin, Some(Uuid::new_v4()), Some(10));
    let bin_b = location(tenant_id, "B2", LocationType::Bin, Some(Uuid::new_v4()), Some(10));

    let requests: Vec<FefoAssignmentRequest> = [7i64, 5, 3]
        .into_iter()
        .enumerate()
        .map(|(i, qty)| FefoAssignmentRequest {
            stock_item_id: Uuid::new_v4(),
            quantity: qty,
            expiration_date: Some(today() + Duration::days(i as i64 + 10)),
            classification: StockClassification::Normal,
        })
        .collect();

    let candidates = vec![BinCandidate::from(&bin_a), BinCandidate::from(&bin_b)];
    let plan = plan_assignments(&requests, &candidates, today());

    assert!(plan.unassigned.is_empty());
    let assigned: i64 = plan.assignments.iter().map(|a| a.quantity).sum();
    assert_eq!(assigned, 15);
    assert_eq!(20 - assigned, 5);
}

#[test]
fn expired_stock_is_classified_flagged_and_excluded_from_fefo() {
    let tenant_id = Uuid::new_v4();
    let mut item = StockItem::create(
        tenant_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        4,
        Some(today() - Duration::days(1)),
        today(),
    )
    .unwrap();

    assert_eq!(item.classification, StockClassification::Expired);
    assert_eq!(classify(item.expiration_date, today()), StockClassification::Expired);
    let events = item.take_events();
    assert!(events.iter().any(|e| matches!(e, DomainEvent::StockExpired(_))));

    let bin = location(tenant_id, "B1", LocationType::Bin, Some(Uuid::new_v4()), Some(10));
    let plan = plan_assignments(
        &[FefoAssignmentRequest {
            stock_item_id: item.stock_item_id,
            quantity: 4,
            expiration_date: item.expiration_date,
            classification: item.classification,
        }],
        &[BinCandidate::from(&bin)],
        today(),
    );
    assert!(plan.assignments.is_empty());
    assert_eq!(plan.unassigned, vec![item.stock_item_id]);
}

#[test]
fn completion_failing_its_precondition_leaves_everything_untouched() {
    let tenant_id = Uuid::new_v4();
    let mut source = location(tenant_id, "SRC", LocationType::Bin, Some(Uuid::new_v4()), Some(10));
    let mut destination =
        location(tenant_id, "DST", LocationType::Bin, Some(Uuid::new_v4()), Some(5));

    let item_id = Uuid::new_v4();
    source.assign_stock(item_id, 6).unwrap();
    source.take_events();

    let mut movement = StockMovement::initiate(
        tenant_id,
        item_id,
        Uuid::new_v4(),
        source.location_id,
        destination.location_id,
        4,
        MovementType::Transfer,
        None,
        Uuid::new_v4(),
    )
    .unwrap();
    movement.take_events();

    // The destination filled up between initiation and completion
    destination.assign_stock(Uuid::new_v4(), 3).unwrap();
    destination.take_events();

    // Completion re-checks the precondition first, exactly like the
    // movement service does
    assert!(!destination.can_accommodate(movement.quantity));
    assert_eq!(movement.status, wms_service_core::MovementStatus::Initiated);
    assert_eq!(source.capacity.current, 6);
    assert_eq!(destination.capacity.current, 3);
}

#[test]
fn completed_movement_moves_capacity_and_relocates_the_item() {
    let tenant_id = Uuid::new_v4();
    let mut source = location(tenant_id, "SRC", LocationType::Bin, Some(Uuid::new_v4()), Some(10));
    let mut destination =
        location(tenant_id, "DST", LocationType::Bin, Some(Uuid::new_v4()), Some(10));

    let mut item = StockItem::create(
        tenant_id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        4,
        Some(today() + Duration::days(30)),
        today(),
    )
    .unwrap();
    item.assign_location(source.location_id, 4).unwrap();
    source.assign_stock(item.stock_item_id, 4).unwrap();
    item.take_events();
    source.take_events();

    let mut movement = StockMovement::initiate(
        tenant_id,
        item.stock_item_id,
        item.product_id,
        source.location_id,
        destination.location_id,
        4,
        MovementType::Transfer,
        None,
        Uuid::new_v4(),
    )
    .unwrap();
    movement.take_events();

    assert!(destination.can_accommodate(movement.quantity));
    movement.complete().unwrap();
    source.release_stock(item.stock_item_id, movement.quantity).unwrap();
    destination.assign_stock(item.stock_item_id, movement.quantity).unwrap();
    item.relocate(destination.location_id);

    assert_eq!(source.capacity.current, 0);
    assert_eq!(source.status, LocationStatus::Available);
    assert_eq!(destination.capacity.current, 4);
    assert_eq!(destination.status, LocationStatus::Occupied);
    assert_eq!(item.location_id, Some(destination.location_id));
    assert_eq!(item.quantity, 4);
    assert!(movement
        .take_events()
        .iter()
        .any(|e| matches!(e, DomainEvent::StockMovementCompleted(_))));
}
