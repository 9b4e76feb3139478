//! Property tests for the universal domain invariants

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use uuid::Uuid;

use wms_service_core::domains::events::DomainEvent;
use wms_service_core::domains::location::{Location, LocationType};
use wms_service_core::services::fefo::{plan_assignments, BinCandidate, FefoAssignmentRequest};
use wms_service_core::{classify, LocationStatus, StockClassification, StockItem};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn bin(max: i64) -> Location {
    let mut location = Location::create(
        Uuid::new_v4(),
        Some(Uuid::new_v4()),
        Some("B1".to_string()),
        None,
        None,
        LocationType::Bin,
        None,
        Some(max),
        None,
    )
    .unwrap();
    location.take_events();
    location
}

proptest! {
    /// capacity.current stays within [0, maximum] under any accepted
    /// sequence of assign/release operations
    #[test]
    fn capacity_never_escapes_its_bounds(
        max in 1i64..50,
        ops in prop::collection::vec((prop::bool::ANY, 1i64..20), 1..40),
    ) {
        let mut location = bin(max);
        for (is_assign, qty) in ops {
            let result = if is_assign {
                location.assign_stock(Uuid::new_v4(), qty)
            } else {
                location.release_stock(Uuid::new_v4(), qty)
            };
            // Rejected operations must not have changed anything either
            let _ = result;
            prop_assert!(location.capacity.current >= 0);
            prop_assert!(location.capacity.current <= max);
        }
    }

    /// 0 <= allocated <= quantity across all accepted operations
    #[test]
    fn allocation_never_exceeds_quantity(
        initial in 0i64..100,
        ops in prop::collection::vec((0usize..4, 0i64..120), 1..40),
    ) {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            initial,
            None,
            today(),
        ).unwrap();
        for (op, qty) in ops {
            let _ = match op {
                0 => item.update_allocated_quantity(qty),
                1 => item.increase_quantity(qty, "count"),
                2 => item.decrease_quantity(qty, "count"),
                _ => item.update_quantity(qty, "count"),
            };
            prop_assert!(item.allocated_quantity >= 0);
            prop_assert!(item.allocated_quantity <= item.quantity);
            prop_assert!(item.quantity >= 0);
        }
    }

    /// Classification is pure: same input, same day, same label
    #[test]
    fn classification_is_deterministic(offset in -1000i64..2000) {
        let date = Some(today() + Duration::days(offset));
        prop_assert_eq!(classify(date, today()), classify(date, today()));
    }

    /// Reclassifying twice in the same day emits at most one transition
    #[test]
    fn reclassification_emits_exactly_once(
        initial_offset in -10i64..400,
        new_offset in -10i64..400,
    ) {
        let mut item = StockItem::create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            10,
            Some(today() + Duration::days(initial_offset)),
            today(),
        ).unwrap();
        item.take_events();

        let old = item.classification;
        item.update_expiration_date(Some(today() + Duration::days(new_offset)), today()).unwrap();
        let classified_events = item
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, DomainEvent::StockClassified(_)))
            .count();
        if item.classification == old {
            prop_assert_eq!(classified_events, 0);
        } else {
            prop_assert_eq!(classified_events, 1);
        }

        // Running it again the same day is a no-op
        item.reclassify(today());
        prop_assert!(item.take_events().is_empty());
    }

    /// If A expires before B and only one fits, A gets the bin
    #[test]
    fn fefo_prefers_the_earlier_expiry(
        early_offset in 1i64..100,
        gap in 1i64..100,
        qty in 1i64..10,
    ) {
        let early = FefoAssignmentRequest {
            stock_item_id: Uuid::new_v4(),
            quantity: qty,
            expiration_date: Some(today() + Duration::days(early_offset)),
            classification: StockClassification::Normal,
        };
        let late = FefoAssignmentRequest {
            stock_item_id: Uuid::new_v4(),
            quantity: qty,
            expiration_date: Some(today() + Duration::days(early_offset + gap)),
            classification: StockClassification::Normal,
        };
        let candidates = vec![BinCandidate {
            location_id: Uuid::new_v4(),
            barcode: "BN00000001".to_string(),
            location_type: LocationType::Bin,
            status: LocationStatus::Available,
            remaining_capacity: qty,
        }];

        // Order of submission must not matter
        for requests in [vec![late.clone(), early.clone()], vec![early.clone(), late.clone()]] {
            let plan = plan_assignments(&requests, &candidates, today());
            prop_assert_eq!(plan.assignments.len(), 1);
            prop_assert_eq!(plan.assignments[0].stock_item_id, early.stock_item_id);
            prop_assert_eq!(plan.unassigned.clone(), vec![late.stock_item_id]);
        }
    }

    /// The planner never oversubscribes a bin
    #[test]
    fn fefo_respects_remaining_capacity(
        capacities in prop::collection::vec(1i64..20, 1..6),
        quantities in prop::collection::vec(1i64..15, 1..20),
    ) {
        let candidates: Vec<BinCandidate> = capacities
            .iter()
            .enumerate()
            .map(|(i, &capacity)| BinCandidate {
                location_id: Uuid::new_v4(),
                barcode: format!("BN{:08}", i),
                location_type: LocationType::Bin,
                status: LocationStatus::Available,
                remaining_capacity: capacity,
            })
            .collect();
        let requests: Vec<FefoAssignmentRequest> = quantities
            .iter()
            .enumerate()
            .map(|(i, &qty)| FefoAssignmentRequest {
                stock_item_id: Uuid::new_v4(),
                quantity: qty,
                expiration_date: Some(today() + Duration::days(i as i64 + 1)),
                classification: StockClassification::Normal,
            })
            .collect();

        let plan = plan_assignments(&requests, &candidates, today());
        for candidate in &candidates {
            let assigned: i64 = plan
                .assignments
                .iter()
                .filter(|a| a.location_id == candidate.location_id)
                .map(|a| a.quantity)
                .sum();
            prop_assert!(assigned <= candidate.remaining_capacity);
        }
        prop_assert_eq!(plan.assignments.len() + plan.unassigned.len(), requests.len());
    }
}
