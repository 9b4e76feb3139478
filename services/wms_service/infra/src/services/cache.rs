//! Redis-backed read cache for locations
//!
//! Only single-id reads are cached; collection queries always hit the
//! database, which keeps invalidation to one key per write. Cache errors
//! degrade to a database read with a warning.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_error::AppError;
use shared_types::{Page, PageParams, TenantContext};
use wms_service_core::dto::{LocationFilter, LocationResponse};
use wms_service_core::repositories::LocationReadPort;
use wms_service_core::Result;

const DEFAULT_TTL_SECONDS: u64 = 60;

/// Redis cache for single-location reads
pub struct LocationCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl LocationCache {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::InternalError(format!("Redis client error: {}", e)))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| AppError::InternalError(format!("Redis connection error: {}", e)))?;
        Ok(Self {
            conn,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        })
    }

    fn key(tenant_id: Uuid, location_id: Uuid) -> String {
        format!("wms:location:{}:{}", tenant_id, location_id)
    }

    pub async fn get(&self, tenant_id: Uuid, location_id: Uuid) -> Option<LocationResponse> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = match conn.get(Self::key(tenant_id, location_id)).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Location cache read failed: {}", e);
                return None;
            },
        };
        cached.and_then(|json| serde_json::from_str(&json).ok())
    }

    pub async fn put(&self, location: &LocationResponse) {
        let json = match serde_json::to_string(location) {
            Ok(json) => json,
            Err(e) => {
                warn!("Location cache serialization failed: {}", e);
                return;
            },
        };
        let mut conn = self.conn.clone();
        let key = Self::key(location.tenant_id, location.location_id);
        if let Err(e) = conn.set_ex::<_, _, ()>(&key, json, self.ttl_seconds).await {
            warn!("Location cache write failed: {}", e);
        }
    }

    pub async fn invalidate(&self, tenant_id: Uuid, location_id: Uuid) {
        let mut conn = self.conn.clone();
        let key = Self::key(tenant_id, location_id);
        if let Err(e) = conn.del::<_, ()>(&key).await {
            warn!("Location cache invalidation failed: {}", e);
        } else {
            debug!(%location_id, "Location cache entry invalidated");
        }
    }
}

/// Caching decorator over a location read port
pub struct CachedLocationReadPort {
    inner: Arc<dyn LocationReadPort>,
    cache: Arc<LocationCache>,
}

impl CachedLocationReadPort {
    pub fn new(inner: Arc<dyn LocationReadPort>, cache: Arc<LocationCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl LocationReadPort for CachedLocationReadPort {
    async fn get(
        &self,
        ctx: &TenantContext,
        location_id: Uuid,
    ) -> Result<Option<LocationResponse>> {
        if let Some(cached) = self.cache.get(ctx.tenant_id, location_id).await {
            return Ok(Some(cached));
        }
        let location = self.inner.get(ctx, location_id).await?;
        if let Some(location) = &location {
            self.cache.put(location).await;
        }
        Ok(location)
    }

    // Collections bypass the cache

    async fn list(
        &self,
        ctx: &TenantContext,
        filter: &LocationFilter,
        page: PageParams,
    ) -> Result<Page<LocationResponse>> {
        self.inner.list(ctx, filter, page).await
    }

    async fn list_available(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>> {
        self.inner.list_available(ctx).await
    }

    async fn list_all(&self, ctx: &TenantContext) -> Result<Vec<LocationResponse>> {
        self.inner.list_all(ctx).await
    }
}
