// Common types used across services
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;

use serde::{Deserialize, Serialize};

/// Ambient per-request value for multi-tenancy.
///
/// Carried explicitly through every command and query call site; repository
/// adapters refuse to execute without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid, user_id: Uuid, roles: Vec<String>) -> Self {
        Self {
            tenant_id,
            user_id,
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Standard pagination request parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Clamp to sane bounds: page >= 1, 1 <= page_size <= 100
    pub fn normalized(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(20).clamp(1, 100);
        (page, page_size)
    }

    pub fn offset(&self) -> i64 {
        let (page, page_size) = self.normalized();
        (page - 1) * page_size
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 { (total + page_size - 1) / page_size } else { 0 };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_normalize_out_of_range_values() {
        let params = PageParams {
            page: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(params.normalized(), (1, 100));
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_computes_total_pages() {
        let page = Page::<i32>::new(vec![], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn tenant_context_role_lookup() {
        let ctx = TenantContext::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec!["warehouse_operator".to_string()],
        );
        assert!(ctx.has_role("warehouse_operator"));
        assert!(!ctx.has_role("admin"));
    }
}
