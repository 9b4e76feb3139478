use once_cell::sync::Lazy;
use regex::Regex;
use shared_error::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Initialize database connection pool
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {}", e)))
}

/// Every tenant schema name must match this shape before it is interpolated
/// into SQL. The literal `public` is also accepted.
static SCHEMA_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tenant_[A-Za-z0-9_]+_schema$").unwrap());

/// Validated per-tenant storage namespace name.
///
/// Construction is the only place schema names are derived or checked; all
/// SQL that references a schema goes through [`TenantSchema::quoted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSchema(String);

impl TenantSchema {
    /// Derive the schema name for a tenant id.
    pub fn for_tenant(tenant_id: Uuid) -> Self {
        let slug = tenant_id.simple().to_string();
        Self(format!("tenant_{}_schema", slug))
    }

    /// The shared `public` schema, used for cross-tenant infrastructure
    /// tables such as the event outbox.
    pub fn public() -> Self {
        Self("public".to_string())
    }

    /// Validate an externally supplied schema name.
    pub fn parse(name: &str) -> Result<Self, AppError> {
        if name == "public" || SCHEMA_NAME_RE.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(AppError::InvalidTenantSchema(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted identifier for interpolation into SQL. The constructor already
    /// restricts the character set, so quoting cannot be escaped.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for TenantSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_name_derived_from_tenant_id() {
        let tenant_id = Uuid::parse_str("0191f3a8-0000-7000-8000-000000000001").unwrap();
        let schema = TenantSchema::for_tenant(tenant_id);
        assert_eq!(schema.as_str(), "tenant_0191f3a8000070008000000000000001_schema");
    }

    #[test]
    fn derived_names_always_validate() {
        for _ in 0..32 {
            let schema = TenantSchema::for_tenant(Uuid::new_v4());
            assert!(TenantSchema::parse(schema.as_str()).is_ok());
        }
    }

    #[test]
    fn public_schema_is_accepted() {
        assert!(TenantSchema::parse("public").is_ok());
    }

    #[test]
    fn malformed_names_are_rejected() {
        for bad in [
            "tenant__schema; DROP TABLE locations",
            "tenant_abc",
            "abc_schema",
            "tenant_a-b_schema",
            "Tenant_abc_schema\"",
            "",
        ] {
            assert!(TenantSchema::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn quoting_wraps_identifier() {
        let schema = TenantSchema::for_tenant(Uuid::new_v4());
        let quoted = schema.quoted();
        assert!(quoted.starts_with('"') && quoted.ends_with('"'));
    }
}
