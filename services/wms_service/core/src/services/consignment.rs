//! Service traits for consignment intake and queries

use async_trait::async_trait;

use shared_types::{Page, PageParams, TenantContext};

use crate::dto::{
    ConsignmentDetailResponse, ConsignmentFilter, ConsignmentResponse, ReceiveConsignmentRequest,
};
use crate::Result;

#[async_trait]
pub trait ConsignmentService: Send + Sync {
    /// Receive a consignment: create the consignment record and one stock
    /// item per line in a single transaction. Each item is classified at
    /// creation and the transition events are published after commit.
    async fn receive_consignment(
        &self,
        ctx: &TenantContext,
        request: ReceiveConsignmentRequest,
    ) -> Result<ConsignmentDetailResponse>;
}

#[async_trait]
pub trait ConsignmentQueries: Send + Sync {
    async fn list_consignments(
        &self,
        ctx: &TenantContext,
        filter: ConsignmentFilter,
        page: PageParams,
    ) -> Result<Page<ConsignmentResponse>>;
}
