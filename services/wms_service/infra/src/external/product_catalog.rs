//! HTTP adapter for the product catalog collaborator
//!
//! Lookups carry a bounded timeout. A 404 is a normal `None`; transport and
//! server failures surface as External errors, which query enrichment
//! swallows with a warning.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use shared_error::AppError;
use wms_service_core::repositories::{ProductCatalogPort, ProductMetadata};
use wms_service_core::Result;

pub struct HttpProductCatalog {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProductCatalog {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| AppError::ConfigError(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ProductCatalogPort for HttpProductCatalog {
    async fn get_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<ProductMetadata>> {
        let url = format!(
            "{}/api/v1/tenants/{}/products/{}",
            self.base_url, tenant_id, product_id
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Product catalog request: {}", e)))?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let metadata = response.json::<ProductMetadata>().await.map_err(|e| {
                    AppError::ExternalService(format!("Product catalog payload: {}", e))
                })?;
                Ok(Some(metadata))
            },
            status => Err(AppError::ExternalService(format!(
                "Product catalog returned {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_metadata_on_success() {
        let server = MockServer::start().await;
        let tenant_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/api/v1/tenants/{}/products/{}", tenant_id, product_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "productId": product_id,
                "sku": "SKU-001",
                "name": "Frozen peas 1kg",
                "unitOfMeasure": "bag"
            })))
            .mount(&server)
            .await;

        let catalog = HttpProductCatalog::new(&server.uri(), 2_000).unwrap();
        let metadata = catalog.get_product(tenant_id, product_id).await.unwrap().unwrap();
        assert_eq!(metadata.product_id, product_id);
        assert_eq!(metadata.sku.as_deref(), Some("SKU-001"));
    }

    #[tokio::test]
    async fn not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let catalog = HttpProductCatalog::new(&server.uri(), 2_000).unwrap();
        let metadata = catalog.get_product(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert!(metadata.is_none());
    }

    #[tokio::test]
    async fn server_error_is_external() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = HttpProductCatalog::new(&server.uri(), 2_000).unwrap();
        let result = catalog.get_product(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
