//! First-Expired-First-Out assignment planner
//!
//! A pure function from assignment requests and candidate locations to a
//! partial assignment plan. Requests the planner cannot place are reported
//! as unassigned, not as an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::location::{Location, LocationStatus, LocationType};
use crate::domains::stock_item::{classify, StockClassification};

/// One stock item asking for a BIN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FefoAssignmentRequest {
    pub stock_item_id: Uuid,
    pub quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    pub classification: StockClassification,
}

/// Candidate view of a location, decoupled from the aggregate so the planner
/// can run over read-model rows as well
#[derive(Debug, Clone)]
pub struct BinCandidate {
    pub location_id: Uuid,
    pub barcode: String,
    pub location_type: LocationType,
    pub status: LocationStatus,
    pub remaining_capacity: i64,
}

impl From<&Location> for BinCandidate {
    fn from(location: &Location) -> Self {
        Self {
            location_id: location.location_id,
            barcode: location.barcode.clone(),
            location_type: location.location_type,
            status: location.status,
            remaining_capacity: location.remaining_capacity(),
        }
    }
}

/// A planned placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FefoAssignment {
    pub stock_item_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i64,
}

/// Planner output: placements plus the requests that found no fitting BIN
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FefoPlan {
    pub assignments: Vec<FefoAssignment>,
    pub unassigned: Vec<Uuid>,
}

impl FefoPlan {
    pub fn location_for(&self, stock_item_id: Uuid) -> Option<Uuid> {
        self.assignments
            .iter()
            .find(|a| a.stock_item_id == stock_item_id)
            .map(|a| a.location_id)
    }
}

/// Plan FEFO assignments.
///
/// Candidates are filtered to BINs in AVAILABLE or RESERVED status with
/// remaining capacity; requests classified EXPIRED at `today` are excluded.
/// Requests are walked earliest-expiry-first (nulls last, insertion order as
/// the stable tie-break); each takes the first BIN that accommodates it,
/// where BINs are ordered by remaining capacity descending with barcode as
/// the deterministic tie-break.
pub fn plan_assignments(
    requests: &[FefoAssignmentRequest],
    candidates: &[BinCandidate],
    today: NaiveDate,
) -> FefoPlan {
    let mut bins: Vec<BinCandidate> = candidates
        .iter()
        .filter(|c| {
            c.location_type == LocationType::Bin
                && matches!(c.status, LocationStatus::Available | LocationStatus::Reserved)
                && c.remaining_capacity > 0
        })
        .cloned()
        .collect();
    bins.sort_by(|a, b| {
        b.remaining_capacity
            .cmp(&a.remaining_capacity)
            .then_with(|| a.barcode.cmp(&b.barcode))
    });

    // Indices into `requests`, earliest expiry first, nulls last; sort is
    // stable so insertion order breaks ties
    let mut order: Vec<usize> = (0..requests.len()).collect();
    order.sort_by(|&a, &b| match (requests[a].expiration_date, requests[b].expiration_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut plan = FefoPlan::default();
    for idx in order {
        let request = &requests[idx];
        if request.quantity <= 0
            || classify(request.expiration_date, today) == StockClassification::Expired
        {
            plan.unassigned.push(request.stock_item_id);
            continue;
        }

        let slot = bins.iter_mut().find(|b| b.remaining_capacity >= request.quantity);
        match slot {
            Some(bin) => {
                bin.remaining_capacity -= request.quantity;
                plan.assignments.push(FefoAssignment {
                    stock_item_id: request.stock_item_id,
                    location_id: bin.location_id,
                    quantity: request.quantity,
                });
            },
            None => plan.unassigned.push(request.stock_item_id),
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn request(qty: i64, expiry: Option<NaiveDate>) -> FefoAssignmentRequest {
        FefoAssignmentRequest {
            stock_item_id: Uuid::new_v4(),
            quantity: qty,
            expiration_date: expiry,
            classification: classify(expiry, today()),
        }
    }

    fn bin(barcode: &str, remaining: i64) -> BinCandidate {
        BinCandidate {
            location_id: Uuid::new_v4(),
            barcode: barcode.to_string(),
            location_type: LocationType::Bin,
            status: LocationStatus::Available,
            remaining_capacity: remaining,
        }
    }

    #[test]
    fn earliest_expiry_wins_the_contested_bin() {
        let late = request(5, Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        let early = request(5, Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
        let bins = vec![bin("BN00000001", 5)];

        let plan = plan_assignments(&[late.clone(), early.clone()], &bins, today());
        assert_eq!(plan.location_for(early.stock_item_id), Some(bins[0].location_id));
        assert_eq!(plan.location_for(late.stock_item_id), None);
        assert_eq!(plan.unassigned, vec![late.stock_item_id]);
    }

    #[test]
    fn both_items_share_a_bin_when_capacity_allows() {
        // Items of 3 and 5 units into one BIN of capacity 8
        let s1 = request(3, Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        let s2 = request(5, Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
        let bins = vec![bin("BN00000001", 8)];

        let plan = plan_assignments(&[s1.clone(), s2.clone()], &bins, today());
        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.location_for(s1.stock_item_id), Some(bins[0].location_id));
        assert_eq!(plan.location_for(s2.stock_item_id), Some(bins[0].location_id));
        assert!(plan.unassigned.is_empty());
        // s2 expires first, so it is planned first
        assert_eq!(plan.assignments[0].stock_item_id, s2.stock_item_id);
    }

    #[test]
    fn fifteen_units_spread_over_two_bins_of_ten() {
        let requests = vec![
            request(6, Some(today() + Duration::days(40))),
            request(5, Some(today() + Duration::days(50))),
            request(4, Some(today() + Duration::days(60))),
        ];
        let bins = vec![bin("BN00000001", 10), bin("BN00000002", 10)];

        let plan = plan_assignments(&requests, &bins, today());
        assert_eq!(plan.assignments.len(), 3);
        assert!(plan.unassigned.is_empty());
        let residual: i64 = 20 - plan.assignments.iter().map(|a| a.quantity).sum::<i64>();
        assert_eq!(residual, 5);
    }

    #[test]
    fn expired_items_are_excluded() {
        let expired = request(2, Some(today() - Duration::days(1)));
        let fresh = request(2, Some(today() + Duration::days(10)));
        let bins = vec![bin("BN00000001", 10)];

        let plan = plan_assignments(&[expired.clone(), fresh.clone()], &bins, today());
        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].stock_item_id, fresh.stock_item_id);
        assert_eq!(plan.unassigned, vec![expired.stock_item_id]);
    }

    #[test]
    fn null_expiry_sorts_last_but_still_assigns() {
        let dated = request(4, Some(today() + Duration::days(5)));
        let undated = request(4, None);
        let bins = vec![bin("BN00000001", 8)];

        let plan = plan_assignments(&[undated.clone(), dated.clone()], &bins, today());
        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.assignments[0].stock_item_id, dated.stock_item_id);
        assert_eq!(plan.assignments[1].stock_item_id, undated.stock_item_id);
    }

    #[test]
    fn non_bin_blocked_and_full_candidates_are_filtered() {
        let mut rack = bin("RK00000001", 10);
        rack.location_type = LocationType::Rack;
        let mut blocked = bin("BN00000009", 10);
        blocked.status = LocationStatus::Blocked;
        let full = bin("BN00000008", 0);

        let plan = plan_assignments(
            &[request(1, Some(today() + Duration::days(10)))],
            &[rack, blocked, full],
            today(),
        );
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.unassigned.len(), 1);
    }

    #[test]
    fn reserved_bins_are_eligible() {
        let mut reserved = bin("BN00000002", 4);
        reserved.status = LocationStatus::Reserved;
        let plan = plan_assignments(
            &[request(3, Some(today() + Duration::days(10)))],
            &[reserved],
            today(),
        );
        assert_eq!(plan.assignments.len(), 1);
    }

    #[test]
    fn ties_break_by_capacity_then_barcode() {
        let a = bin("BN00000002", 6);
        let b = bin("BN00000001", 6);
        let c = bin("BN00000003", 9);

        let plan = plan_assignments(
            &[request(2, Some(today() + Duration::days(10)))],
            &[a, b.clone(), c.clone()],
            today(),
        );
        // largest remaining capacity first
        assert_eq!(plan.assignments[0].location_id, c.location_id);

        let plan = plan_assignments(
            &[request(8, Some(today() + Duration::days(10))), request(2, None)],
            &[bin("BN00000002", 6), b.clone(), c.clone()],
            today(),
        );
        // the 8-unit request consumes the big bin; the 2-unit request falls
        // through to the lexicographically smaller of the 6-unit bins
        assert_eq!(plan.assignments[1].location_id, b.location_id);
    }

    #[test]
    fn partial_result_is_not_an_error() {
        let plan = plan_assignments(
            &[request(100, Some(today() + Duration::days(10)))],
            &[bin("BN00000001", 5)],
            today(),
        );
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.unassigned.len(), 1);
    }
}
