//! External product catalog port
//!
//! Query handlers enrich stock results through this collaborator. Lookups
//! are best-effort: not-found returns `None`, and adapters bound their
//! timeouts so a slow catalog degrades rather than blocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Product metadata owned by the catalog collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProductMetadata {
    pub product_id: Uuid,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub unit_of_measure: Option<String>,
}

#[async_trait]
pub trait ProductCatalogPort: Send + Sync {
    async fn get_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<ProductMetadata>>;
}
