use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_error::AppError;
use shared_jwt::Claims;
use shared_types::TenantContext;

pub trait JwtSecretProvider {
    fn get_jwt_secret(&self) -> &str;
}

/// Authenticated user information extracted from a bearer JWT.
///
/// This extractor validates the token and surfaces the security context; it
/// does not perform any authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            roles: claims.roles,
        }
    }

    /// The ambient tenant context this request runs under.
    pub fn context(&self) -> TenantContext {
        TenantContext::new(self.tenant_id, self.user_id, self.roles.clone())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Reject commands whose tenant disagrees with the security context.
    pub fn ensure_tenant(&self, command_tenant: Uuid) -> Result<(), AppError> {
        if self.tenant_id == command_tenant {
            Ok(())
        } else {
            Err(AppError::TenantMismatch {
                expected: self.tenant_id.to_string(),
                actual: command_tenant.to_string(),
            })
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + JwtSecretProvider,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        // Extract token from "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Malformed Authorization header".to_string()))?;

        let secret = state.get_jwt_secret();
        let claims = shared_jwt::decode_jwt(token, secret).map_err(|e| {
            warn!("JWT decode failed: {}", e);
            e
        })?;

        debug!(
            "AuthUser extracted: user_id={}, tenant_id={}",
            claims.sub, claims.tenant_id
        );

        Ok(AuthUser::from_claims(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_tenant_accepts_matching_tenant() {
        let tenant_id = Uuid::new_v4();
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            tenant_id,
            roles: vec![],
        };
        assert!(user.ensure_tenant(tenant_id).is_ok());
    }

    #[test]
    fn ensure_tenant_rejects_foreign_tenant() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            roles: vec![],
        };
        let result = user.ensure_tenant(Uuid::new_v4());
        assert!(matches!(result, Err(AppError::TenantMismatch { .. })));
    }
}
