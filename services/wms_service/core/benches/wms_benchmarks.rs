use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use wms_service_core::domains::location::{LocationStatus, LocationType};
use wms_service_core::services::fefo::{plan_assignments, BinCandidate, FefoAssignmentRequest};
use wms_service_core::{classify, StockClassification};

fn bench_classify(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let dates: Vec<_> = (-30..400).map(|d| Some(today + Duration::days(d))).collect();

    c.bench_function("classify_430_dates", |b| {
        b.iter(|| {
            for date in &dates {
                black_box(classify(black_box(*date), today));
            }
        })
    });
}

fn bench_fefo_plan(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    let requests: Vec<FefoAssignmentRequest> = (0..500)
        .map(|i| {
            let expiry = Some(today + Duration::days((i % 90) as i64 + 1));
            FefoAssignmentRequest {
                stock_item_id: Uuid::new_v4(),
                quantity: (i % 7) as i64 + 1,
                expiration_date: expiry,
                classification: StockClassification::Normal,
            }
        })
        .collect();

    let bins: Vec<BinCandidate> = (0..200)
        .map(|i| BinCandidate {
            location_id: Uuid::new_v4(),
            barcode: format!("BN{:010}", i),
            location_type: LocationType::Bin,
            status: LocationStatus::Available,
            remaining_capacity: 20,
        })
        .collect();

    c.bench_function("fefo_plan_500_requests_200_bins", |b| {
        b.iter(|| black_box(plan_assignments(black_box(&requests), black_box(&bins), today)))
    });
}

criterion_group!(benches, bench_classify, bench_fefo_plan);
criterion_main!(benches);
