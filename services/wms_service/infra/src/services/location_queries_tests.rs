//! Unit tests for the location query service using a mocked read port

use chrono::Utc;
use mockall::mock;
use std::sync::Arc;
use uuid::Uuid;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::domains::location::{LocationStatus, LocationType};
use wms_service_core::dto::{LocationFilter, LocationResponse};
use wms_service_core::repositories::LocationReadPort;
use wms_service_core::services::LocationQueries;
use wms_service_core::Result;

use super::location::LocationQueriesImpl;

mock! {
    pub LocationReadPortImpl {}

    #[async_trait::async_trait]
    impl LocationReadPort for LocationReadPortImpl {
        async fn get(
            &self,
            ctx: &TenantContext,
            location_id: Uuid,
        ) -> Result<Option<LocationResponse>>;
        async fn list(
            &self,
            ctx: &TenantContext,
            filter: &LocationFilter,
            page: PageParams,
        ) -> Result<Page<LocationResponse>>;
        async fn list_available(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>>;
        async fn list_all(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>>;
    }
}

fn ctx() -> TenantContext {
    TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![])
}

fn record(
    tenant_id: Uuid,
    code: &str,
    location_type: LocationType,
    parent: Option<Uuid>,
) -> LocationResponse {
    LocationResponse {
        location_id: Uuid::new_v4(),
        tenant_id,
        parent_location_id: parent,
        code: Some(code.to_string()),
        name: None,
        barcode: format!("{}00000000", code),
        location_type,
        coordinates: None,
        status: LocationStatus::Available,
        capacity_current: 0,
        capacity_maximum: Some(10),
        description: None,
        created_at: Utc::now(),
        last_modified_at: Utc::now(),
        version: 1,
    }
}

#[tokio::test]
async fn get_location_builds_the_hierarchy_path() {
    let ctx = ctx();
    let warehouse = record(ctx.tenant_id, "WH1", LocationType::Warehouse, None);
    let zone = record(ctx.tenant_id, "Z1", LocationType::Zone, Some(warehouse.location_id));
    let bin = record(ctx.tenant_id, "B1", LocationType::Bin, Some(zone.location_id));
    let bin_id = bin.location_id;

    let mut reads = MockLocationReadPortImpl::new();
    let bin_clone = bin.clone();
    reads
        .expect_get()
        .times(1)
        .returning(move |_, _| Ok(Some(bin_clone.clone())));
    let all = vec![warehouse, zone, bin];
    reads.expect_list_all().times(1).returning(move |_| Ok(all.clone()));

    let queries = LocationQueriesImpl::new(Arc::new(reads));
    let detail = queries.get_location(&ctx, bin_id).await.unwrap();
    assert_eq!(detail.path, "/WH1/Z1/B1");
    assert_eq!(detail.location.location_id, bin_id);
}

#[tokio::test]
async fn get_location_of_cyclic_chain_yields_empty_path() {
    let ctx = ctx();
    let mut a = record(ctx.tenant_id, "A1", LocationType::Zone, None);
    let mut b = record(ctx.tenant_id, "B2", LocationType::Zone, None);
    a.parent_location_id = Some(b.location_id);
    b.parent_location_id = Some(a.location_id);
    let a_id = a.location_id;

    let mut reads = MockLocationReadPortImpl::new();
    let a_clone = a.clone();
    reads.expect_get().returning(move |_, _| Ok(Some(a_clone.clone())));
    let all = vec![a, b];
    reads.expect_list_all().returning(move |_| Ok(all.clone()));

    let queries = LocationQueriesImpl::new(Arc::new(reads));
    let detail = queries.get_location(&ctx, a_id).await.unwrap();
    assert_eq!(detail.path, "");
}

#[tokio::test]
async fn missing_location_is_not_found() {
    let ctx = ctx();
    let mut reads = MockLocationReadPortImpl::new();
    reads.expect_get().returning(|_, _| Ok(None));

    let queries = LocationQueriesImpl::new(Arc::new(reads));
    let result = queries.get_location(&ctx, Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn hierarchy_reconstruction_nests_children() {
    let ctx = ctx();
    let warehouse = record(ctx.tenant_id, "WH1", LocationType::Warehouse, None);
    let zone_a = record(ctx.tenant_id, "Z1", LocationType::Zone, Some(warehouse.location_id));
    let zone_b = record(ctx.tenant_id, "Z2", LocationType::Zone, Some(warehouse.location_id));
    let bin = record(ctx.tenant_id, "B1", LocationType::Bin, Some(zone_a.location_id));
    let warehouse_id = warehouse.location_id;

    let mut reads = MockLocationReadPortImpl::new();
    let all = vec![warehouse, zone_a, zone_b, bin];
    reads.expect_list_all().returning(move |_| Ok(all.clone()));

    let queries = LocationQueriesImpl::new(Arc::new(reads));
    let tree = queries.location_hierarchy(&ctx, None).await.unwrap();

    assert_eq!(tree.len(), 1);
    let root = &tree[0];
    assert_eq!(root.location.location_id, warehouse_id);
    assert_eq!(root.children.len(), 2);
    let zone_children: usize = root.children.iter().map(|z| z.children.len()).sum();
    assert_eq!(zone_children, 1);
}

#[tokio::test]
async fn hierarchy_can_start_at_a_level() {
    let ctx = ctx();
    let warehouse = record(ctx.tenant_id, "WH1", LocationType::Warehouse, None);
    let zone = record(ctx.tenant_id, "Z1", LocationType::Zone, Some(warehouse.location_id));
    let bin = record(ctx.tenant_id, "B1", LocationType::Bin, Some(zone.location_id));
    let zone_id = zone.location_id;

    let mut reads = MockLocationReadPortImpl::new();
    let all = vec![warehouse, zone, bin];
    reads.expect_list_all().returning(move |_| Ok(all.clone()));

    let queries = LocationQueriesImpl::new(Arc::new(reads));
    let tree = queries.location_hierarchy(&ctx, Some(LocationType::Zone)).await.unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].location.location_id, zone_id);
    assert_eq!(tree[0].children.len(), 1);
}
